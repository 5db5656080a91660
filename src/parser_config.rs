/// Parser options controlling error handling and recovery behavior.
///
/// # Example
///
/// ```
/// use pdf_rups::parser_config::ParserOptions;
///
/// // Strict mode - a damaged xref table is an error
/// let strict = ParserOptions::strict();
///
/// // Lenient mode - rebuild the xref table by scanning the file
/// let lenient = ParserOptions::lenient();
/// assert!(lenient.reconstruct_xref);
/// assert!(!strict.reconstruct_xref);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Fail on first error (true) or attempt recovery (false)
    pub strict: bool,

    /// Rebuild the cross-reference table by scanning when it cannot be read
    pub reconstruct_xref: bool,

    /// Maximum PDF file size in bytes (0 = unlimited)
    pub max_file_size: usize,
}

impl Default for ParserOptions {
    /// Default configuration: lenient mode
    fn default() -> Self {
        Self::lenient()
    }
}

impl ParserOptions {
    /// Strict mode: fail on any structural error.
    pub fn strict() -> Self {
        Self {
            strict: true,
            reconstruct_xref: false,
            max_file_size: 500 * 1024 * 1024, // 500 MB
        }
    }

    /// Lenient mode: recover from a damaged or missing xref table.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            reconstruct_xref: true,
            max_file_size: 500 * 1024 * 1024, // 500 MB
        }
    }

    /// Check a file size against the configured limit.
    pub(crate) fn allows_size(&self, size: usize) -> bool {
        self.max_file_size == 0 || size <= self.max_file_size
    }
}
