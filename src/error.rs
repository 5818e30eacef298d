//! Error types for the mdpress library.

use std::io;
use thiserror::Error;

/// Result type alias for mdpress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during markdown-to-PDF export.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The markdown input could not be rendered to HTML.
    #[error("Markdown parsing error: {0}")]
    Parse(String),

    /// Styling or sectionizing failed on a malformed fragment.
    #[error("Fragment rendering error: {0}")]
    Render(String),

    /// The rasterizer failed to produce a section image.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// Final PDF serialization or file write failed.
    #[error("Export error: {0}")]
    Export(String),

    /// The input was empty or contained no renderable content.
    #[error("Nothing to export: document is empty")]
    EmptyDocument,

    /// No usable font could be loaded for the built-in rasterizer.
    #[error("No usable font found: {0}")]
    FontUnavailable(String),

    /// The requested page geometry leaves no printable area.
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),
}

impl Error {
    /// Whether the error occurred before any page was composed.
    ///
    /// Callers use this to distinguish "bad input" from "export machinery
    /// failed" when picking a user-facing message.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::Render(_) | Error::EmptyDocument
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyDocument;
        assert_eq!(err.to_string(), "Nothing to export: document is empty");

        let err = Error::Rasterize("scratch surface lost".to_string());
        assert_eq!(
            err.to_string(),
            "Rasterization error: scratch surface lost"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(Error::EmptyDocument.is_input_error());
        assert!(Error::Parse("bad".into()).is_input_error());
        assert!(!Error::Export("disk full".into()).is_input_error());
    }
}
