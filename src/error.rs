//! Error types for the gigsheets library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gigsheets operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while generating song sheets.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration is structurally valid YAML but semantically wrong.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error parsing or serializing a YAML file.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// The image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// The cropped image could not be re-encoded.
    #[error("Failed to encode image: {0}")]
    ImageEncode(String),

    /// The image format is not one we can embed.
    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    /// Error building or writing the PDF structure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Error during plan emission or JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A required file or directory does not exist.
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            image::ImageError::Encoding(e) => Error::ImageEncode(e.to_string()),
            image::ImageError::Unsupported(e) => Error::UnsupportedImage(e.to_string()),
            other => Error::ImageDecode(other.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}
