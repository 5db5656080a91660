//! Error types for the inspector.
//!
//! Covers both the reading side (header, xref and object parsing) and the
//! tree side (resolution, selection and save failures).

use crate::object::ObjectRef;

/// Result type alias for inspector operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, projecting or saving a PDF.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Invalid PDF header (expected '%PDF-')
    #[error("Invalid PDF header: expected '%PDF-', found '{0}'")]
    InvalidHeader(String),

    /// Parse error at specific byte offset
    #[error("Failed to parse object at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Invalid cross-reference table
    #[error("Invalid cross-reference table")]
    InvalidXref,

    /// Referenced object not found in cross-reference table
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// A structural key is absent from an expanded node
    #[error("Key /{key} not found in {node}")]
    NotFound {
        /// The requested key
        key: String,
        /// Summary of the node that was searched
        node: String,
    },

    /// An indirect reference points at an object missing from the xref table
    #[error("Dangling reference: {0}")]
    DanglingReference(ObjectRef),

    /// A resolved value does not match any recognized kind
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// A selection target is not part of the current projection
    #[error("Node is unreachable: {0}")]
    Unreachable(String),

    /// Output bytes could not be written
    #[error("Failed to write {path}: {reason}")]
    WriteFailure {
        /// Target path of the save
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// The document could not be rewritten into a valid structure
    #[error("Cannot rewrite document: {0}")]
    StructuralFailure(String),
}
