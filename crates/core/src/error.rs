//! Error types for presentation scraping and text extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while downloading or extracting presentations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a local file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to (de)serialize JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The caller passed structurally invalid arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation received input it has no defined result for.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The search provider failed to answer a query.
    #[error("Search error: {0}")]
    SearchError(String),

    /// A network request failed before a response was received.
    #[error("Transport error fetching {url}: {message}")]
    TransportError { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// A requested path does not exist.
    #[error("File does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file.
    #[error("Invalid or corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),
}

impl Error {
    /// Whether this error means the file could not be read as a presentation.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat(_)
                | Error::CorruptedFile(_)
                | Error::ZipError(_)
                | Error::XmlError(_)
        )
    }
}
