//! Error types for payqr operations

use crate::fields::{FieldName, REQUIRED_FIELD_MESSAGE};
use thiserror::Error;

/// Result type alias using payqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for payqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required fields are empty
    #[error("Required fields are empty: {}", join_fields(.0))]
    Validation(Vec<FieldName>),

    /// The QR graphic to export has not been rendered
    #[error("QR code graphic is not available for export")]
    GraphicMissing,

    /// Vector-to-raster conversion failed
    #[error("Export failed: {0}")]
    Export(String),

    /// The clipboard rejected a write
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    /// Payload contains characters the target charset cannot represent
    #[error("Failed to transcode payload: {0}")]
    Transcode(String),

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// Persisted form state could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Alert text shown to the person filling the form.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(_) => REQUIRED_FIELD_MESSAGE.to_string(),
            Error::GraphicMissing | Error::Export(_) => {
                "Не удалось загрузить изображение для копирования".to_string()
            }
            Error::Clipboard(reason) => format!("Ошибка копирования изображения: {reason}"),
            other => other.to_string(),
        }
    }
}

fn join_fields(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
