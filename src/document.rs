//! File-backed PDF document.
//!
//! [`PdfDocument`] reads the header, cross-reference table and trailer on
//! open and loads indirect objects lazily, caching each one after its first
//! parse.

use crate::error::{Error, Result};
use crate::graph::ObjectGraph;
use crate::object::{Dict, Object, ObjectRef};
use crate::parser::parse_indirect_object;
use crate::parser_config::ParserOptions;
use crate::xref::{find_xref_offset, parse_xref, reconstruct_xref, CrossRefTable};
use bytes::Bytes;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// PDF document.
///
/// # Example
///
/// ```no_run
/// use pdf_rups::document::PdfDocument;
/// use pdf_rups::graph::ObjectGraph;
///
/// let doc = PdfDocument::open("sample.pdf")?;
/// println!("PDF version: {}.{}", doc.version().0, doc.version().1);
/// println!("Objects: {}", doc.object_refs().len());
/// # Ok::<(), pdf_rups::error::Error>(())
/// ```
pub struct PdfDocument {
    /// File the document was read from, if any
    path: Option<PathBuf>,
    /// Whole file contents
    data: Bytes,
    /// PDF version (major, minor)
    version: (u8, u8),
    /// Cross-reference table mapping object IDs to byte offsets
    xref: CrossRefTable,
    /// Trailer dictionary
    trailer: Dict,
    /// Cache for loaded objects to avoid re-parsing
    object_cache: RefCell<HashMap<ObjectRef, Object>>,
    options: ParserOptions,
    /// Offsets found by scanning, built on the first bad xref offset
    scanned: OnceCell<Option<CrossRefTable>>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("xref_entries", &self.xref.len())
            .field("cached_objects", &self.object_cache.borrow().len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Open a PDF document from a file path with lenient options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ParserOptions::default())
    }

    /// Open a PDF document from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds the configured
    /// size limit, has no valid header, or (in strict mode) has an
    /// unreadable cross-reference table.
    pub fn open_with_options(path: impl AsRef<Path>, options: ParserOptions) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening {}", path.display());
        let data = std::fs::read(path)?;
        let mut doc = Self::from_bytes(data, options)?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Read a document from an in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>, options: ParserOptions) -> Result<Self> {
        let data: Bytes = data.into();
        if !options.allows_size(data.len()) {
            return Err(Error::InvalidPdf(format!(
                "file size {} exceeds limit of {} bytes",
                data.len(),
                options.max_file_size
            )));
        }

        let version = parse_header(&data)?;

        let mut xref = match find_xref_offset(&data).and_then(|offset| parse_xref(&data, offset)) {
            Ok(xref) if !xref.is_empty() && xref.trailer().is_some() => xref,
            Ok(_) if options.reconstruct_xref => reconstruct_xref(&data)?,
            Ok(_) => return Err(Error::InvalidXref),
            Err(e) if options.reconstruct_xref => {
                log::warn!("Cross-reference table unreadable ({}), reconstructing", e);
                reconstruct_xref(&data)?
            },
            Err(e) => return Err(e),
        };

        let trailer = xref.take_trailer().ok_or(Error::InvalidXref)?;
        log::debug!("Read {} xref entries, PDF {}.{}", xref.len(), version.0, version.1);

        Ok(Self {
            path: None,
            data,
            version,
            xref,
            trailer,
            object_cache: RefCell::new(HashMap::new()),
            options,
            scanned: OnceCell::new(),
        })
    }

    /// PDF version from the header.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// File the document was read from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The cross-reference table.
    pub fn xref(&self) -> &CrossRefTable {
        &self.xref
    }

    /// Load an indirect object, using the cache when possible.
    pub fn load_object(&self, obj_ref: ObjectRef) -> Result<Object> {
        if let Some(cached) = self.object_cache.borrow().get(&obj_ref) {
            return Ok(cached.clone());
        }

        let entry = match self.xref.get(obj_ref.id) {
            Some(entry) if entry.in_use && entry.generation == obj_ref.gen => *entry,
            _ => return Err(Error::ObjectNotFound(obj_ref.id, obj_ref.gen)),
        };

        let obj = match self.parse_at(obj_ref, entry.offset) {
            Ok(obj) => obj,
            Err(e) if self.options.strict => return Err(e),
            Err(e) => {
                let offset = self.scanned_offset(obj_ref).filter(|&o| o != entry.offset).ok_or(e)?;
                log::warn!("Bad xref offset for {}, using scanned offset {}", obj_ref, offset);
                self.parse_at(obj_ref, offset)?
            },
        };

        self.object_cache.borrow_mut().insert(obj_ref, obj.clone());
        Ok(obj)
    }

    /// Parse the object stored at `offset`, which must define `obj_ref`.
    fn parse_at(&self, obj_ref: ObjectRef, offset: u64) -> Result<Object> {
        let offset = usize::try_from(offset)
            .ok()
            .filter(|&o| o < self.data.len())
            .ok_or_else(|| Error::ParseError {
                offset: offset as usize,
                reason: format!("offset of {} is outside the file", obj_ref),
            })?;

        log::debug!("Loading object {} at offset {}", obj_ref, offset);
        let (_, (found, obj)) =
            parse_indirect_object(&self.data[offset..]).map_err(|e| Error::ParseError {
                offset,
                reason: format!("{}: {}", obj_ref, e),
            })?;

        if found != obj_ref {
            return Err(Error::ParseError {
                offset,
                reason: format!("expected {} but found {}", obj_ref, found),
            });
        }
        Ok(obj)
    }

    fn scanned_offset(&self, obj_ref: ObjectRef) -> Option<u64> {
        let scanned = self.scanned.get_or_init(|| reconstruct_xref(&self.data).ok());
        scanned
            .as_ref()?
            .get(obj_ref.id)
            .filter(|entry| entry.in_use && entry.generation == obj_ref.gen)
            .map(|entry| entry.offset)
    }
}

impl ObjectGraph for PdfDocument {
    fn trailer(&self) -> &Dict {
        &self.trailer
    }

    fn contains(&self, obj_ref: ObjectRef) -> bool {
        self.xref.contains(obj_ref.id)
    }

    fn resolve(&self, obj_ref: ObjectRef) -> Result<Object> {
        self.load_object(obj_ref)
    }

    fn object_refs(&self) -> Vec<ObjectRef> {
        self.xref.in_use_refs().collect()
    }
}

/// Parse the `%PDF-M.m` header within the first kilobyte.
pub fn parse_header(data: &[u8]) -> Result<(u8, u8)> {
    let head = &data[..data.len().min(1024)];
    let marker = b"%PDF-";
    let pos = head
        .windows(marker.len())
        .position(|w| w == marker)
        .ok_or_else(|| {
            Error::InvalidHeader(String::from_utf8_lossy(&head[..head.len().min(8)]).into_owned())
        })?;

    let version: String = head[pos + marker.len()..]
        .iter()
        .take_while(|c| c.is_ascii_digit() || **c == b'.')
        .map(|&c| c as char)
        .collect();

    let mut parts = version.split('.').map(str::parse::<u8>);
    match (parts.next(), parts.next()) {
        (Some(Ok(major)), Some(Ok(minor))) => Ok((major, minor)),
        _ => Err(Error::InvalidHeader(format!("%PDF-{}", version))),
    }
}
