//! Extraction error types.

use thiserror::Error;

/// Errors that can occur during registration or content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No extractor is registered for the extension.
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    /// A different extractor already owns the extension.
    #[error("Extension {extension} is already registered to extractor '{existing}'")]
    DuplicateExtension { extension: String, existing: String },

    /// The source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The container or markup is not well formed.
    #[error("Malformed {format} document: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    /// The document is readable but uses a structure the extractor does not handle.
    #[error("Unsupported {format} structure: {message}")]
    UnsupportedStructure {
        format: &'static str,
        message: String,
    },

    /// OCR engine failure.
    #[cfg(feature = "ocr")]
    #[error("OCR error: {0}")]
    Ocr(String),

    /// IO error during extraction.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// A thread panicked while holding the registry lock.
    #[error("Extractor registry lock poisoned")]
    RegistryPoisoned,
}

impl ExtractError {
    /// Create a malformed-document error.
    pub fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            message: message.into(),
        }
    }

    /// Create an unsupported-structure error.
    pub fn unsupported_structure(format: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedStructure {
            format,
            message: message.into(),
        }
    }

    /// Whether this error means no extractor handles the file type.
    pub fn is_unsupported_extension(&self) -> bool {
        matches!(self, Self::UnsupportedExtension(_))
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
