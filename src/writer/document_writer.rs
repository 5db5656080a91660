//! Full rewrite of an object graph.
//!
//! Assembles a complete PDF from an [`ObjectGraph`]: header, every in-use
//! object in ascending object number, a classic cross-reference table and
//! the trailer.

use super::object_serializer::ObjectSerializer;
use super::WriteOptions;
use crate::error::{Error, Result};
use crate::graph::ObjectGraph;
use crate::object::{Object, ObjectRef};
use std::io::Write;

/// Writes a whole object graph as a single-revision PDF.
pub struct DocumentWriter<'a> {
    graph: &'a dyn ObjectGraph,
    serializer: ObjectSerializer,
    version: String,
}

impl<'a> DocumentWriter<'a> {
    /// Create a writer for `graph`.
    pub fn new(graph: &'a dyn ObjectGraph, options: &WriteOptions) -> Self {
        let serializer = if options.compact {
            ObjectSerializer::compact()
        } else {
            ObjectSerializer::new()
        };
        Self {
            graph,
            serializer,
            version: options.pdf_version.clone(),
        }
    }

    /// Check that the trailer anchors a readable catalog.
    fn check_structure(&self) -> Result<ObjectRef> {
        let root = match self.graph.trailer().get("Root") {
            Some(Object::Reference(r)) => *r,
            Some(other) => {
                return Err(Error::StructuralFailure(format!(
                    "trailer /Root is {}, not a reference",
                    other.type_name()
                )))
            },
            None => return Err(Error::StructuralFailure("trailer has no /Root entry".to_string())),
        };
        if !self.graph.contains(root) {
            return Err(Error::StructuralFailure(format!("catalog {} is dangling", root)));
        }
        Ok(root)
    }

    /// Build the complete PDF document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StructuralFailure`] if the trailer has no usable
    /// `/Root` or an in-use object cannot be read.
    pub fn finish(&self) -> Result<Vec<u8>> {
        let root = self.check_structure()?;
        let refs = self.graph.object_refs();
        let size = refs.last().map_or(1, |r| r.id + 1);

        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut xref_offsets: Vec<(ObjectRef, usize)> = Vec::with_capacity(refs.len());
        for obj_ref in refs {
            let obj = self.graph.resolve(obj_ref).map_err(|e| {
                Error::StructuralFailure(format!("cannot read object {}: {}", obj_ref, e))
            })?;
            xref_offsets.push((obj_ref, output.len()));
            self.serializer
                .write_indirect(&mut output, obj_ref.id, obj_ref.gen, &obj)?;
        }
        log::debug!("Wrote {} objects, catalog {}", xref_offsets.len(), root);

        // Write xref table
        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", size)?;

        // Object 0 is always free
        writeln!(output, "0000000000 65535 f ")?;

        let mut entries = xref_offsets.iter().peekable();
        for id in 1..size {
            match entries.next_if(|(r, _)| r.id == id) {
                Some((obj_ref, offset)) => writeln!(output, "{:010} {:05} n ", offset, obj_ref.gen)?,
                None => writeln!(output, "0000000000 00000 f ")?,
            }
        }

        let mut trailer = self.graph.trailer().clone();
        trailer.insert("Size".to_string(), Object::Integer(i64::from(size)));
        trailer.shift_remove("Prev");
        trailer.shift_remove("XRefStm");

        writeln!(output, "trailer")?;
        self.serializer
            .write_object(&mut output, &Object::Dictionary(trailer))?;
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        writeln!(output, "%%EOF")?;

        Ok(output)
    }
}
