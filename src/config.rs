//! Configuration for the inspector.

use crate::parser_config::ParserOptions;

/// Inspector configuration.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// Options used when opening files.
    pub parser: ParserOptions,

    /// Write saved documents with minimal whitespace.
    pub compact_output: bool,

    /// PDF version written in the header of saved documents.
    pub pdf_version: String,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            parser: ParserOptions::default(),
            compact_output: false,
            pdf_version: "1.7".to_string(),
        }
    }

    /// Set the parser options.
    pub fn with_parser_options(mut self, parser: ParserOptions) -> Self {
        self.parser = parser;
        self
    }

    /// Enable compact output on save.
    pub fn with_compact_output(mut self, enable: bool) -> Self {
        self.compact_output = enable;
        self
    }

    /// Set the header version of saved documents.
    pub fn with_pdf_version(mut self, version: impl Into<String>) -> Self {
        self.pdf_version = version.into();
        self
    }
}
