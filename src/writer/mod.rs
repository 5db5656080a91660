//! PDF writing.
//!
//! - [`ObjectSerializer`] turns single objects into bytes
//! - [`DocumentWriter`] rewrites a whole object graph
//! - [`save_document`] publishes the rewrite at a path, atomically

mod document_writer;
mod object_serializer;

pub use document_writer::DocumentWriter;
pub use object_serializer::ObjectSerializer;

use crate::config::InspectorConfig;
use crate::error::{Error, Result};
use crate::graph::ObjectGraph;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Options controlling how documents are written.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Minimal whitespace inside objects
    pub compact: bool,
    /// Version written in the `%PDF-` header
    pub pdf_version: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compact: false,
            pdf_version: "1.7".to_string(),
        }
    }
}

impl WriteOptions {
    /// Enable or disable compact output.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

impl From<&InspectorConfig> for WriteOptions {
    fn from(config: &InspectorConfig) -> Self {
        Self {
            compact: config.compact_output,
            pdf_version: config.pdf_version.clone(),
        }
    }
}

/// Rewrite `graph` to `target`.
///
/// The document is serialized in memory first and staged in a temporary
/// file next to `target`, which is only renamed into place once everything
/// has been written. On any failure `target` is left untouched.
///
/// # Errors
///
/// - [`Error::StructuralFailure`] if the graph cannot be rewritten
/// - [`Error::WriteFailure`] if the bytes cannot be written or published
pub fn save_document(graph: &dyn ObjectGraph, target: &Path, options: &WriteOptions) -> Result<()> {
    let bytes = DocumentWriter::new(graph, options).finish()?;

    let write_failure = |e: std::io::Error| Error::WriteFailure {
        path: target.display().to_string(),
        reason: e.to_string(),
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(write_failure)?;
    staged.write_all(&bytes).map_err(write_failure)?;
    staged.as_file().sync_all().map_err(write_failure)?;
    staged.persist(target).map_err(|e| write_failure(e.error))?;

    log::info!("Saved {} bytes to {}", bytes.len(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;
    use crate::object::{Dict, Object};

    fn graph() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        let catalog = graph.add(Object::Dictionary(Dict::new()));
        graph.set_trailer_entry("Root", Object::Reference(catalog));
        graph
    }

    #[test]
    fn test_save_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        save_document(&graph(), &target, &WriteOptions::default()).unwrap();
        let bytes = std::fs::read(&target).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        // No staging files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("out.pdf");
        let result = save_document(&graph(), &target, &WriteOptions::default());
        assert!(matches!(result, Err(Error::WriteFailure { .. })));
        assert!(!target.exists());
    }

    #[test]
    fn test_structural_failure_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        std::fs::write(&target, b"previous").unwrap();

        let result = save_document(&MemoryGraph::new(), &target, &WriteOptions::default());
        assert!(matches!(result, Err(Error::StructuralFailure(_))));
        assert_eq!(std::fs::read(&target).unwrap(), b"previous");
    }

    #[test]
    fn test_options_from_config() {
        let config = InspectorConfig::new().with_compact_output(true).with_pdf_version("1.4");
        let options = WriteOptions::from(&config);
        assert!(options.compact);
        assert_eq!(options.pdf_version, "1.4");
    }
}
