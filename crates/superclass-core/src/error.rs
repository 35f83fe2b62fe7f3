//! Error types for superclass operations.
//!
//! Every failure carries an [`ErrorCode`] for programmatic handling. The
//! pipeline wraps backend failures in [`SuperclassError::ClassificationFailed`];
//! use [`SuperclassError::root`] to reach the underlying kind.

use superclass_extractors::ExtractError;
use thiserror::Error;

/// Result type alias for superclass operations.
pub type SuperclassResult<T> = Result<T, SuperclassError>;

/// Main error type for all superclass operations.
#[derive(Error, Debug)]
pub enum SuperclassError {
    /// Text could not be extracted from the input file.
    #[error("Text extraction failed for {path}: {source}")]
    ExtractionFailed {
        path: String,
        code: ErrorCode,
        #[source]
        source: ExtractError,
    },

    /// Missing or invalid backend configuration (credential, endpoint, parameters).
    #[error("Configuration error: {message}")]
    Configuration { message: String, code: ErrorCode },

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// The backend could not be reached or answered with a non-success status.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        code: ErrorCode,
        status: Option<u16>,
        vendor_code: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend reply is not the expected JSON shape.
    #[error("Decode error: {message}")]
    Decode {
        message: String,
        code: ErrorCode,
        /// Unparsed backend payload.
        raw: String,
    },

    /// The decoded category is not in the caller's allow-list.
    #[error("classifier returned invalid category '{category}' (allowed: {})", allowed.join(", "))]
    InvalidCategory {
        category: String,
        allowed: Vec<String>,
    },

    /// Model is not present in the catalog.
    #[error("Unknown model: {model}")]
    UnknownModel { model: String },

    /// Backend construction or classification failed inside the pipeline.
    #[error("Classification failed: {source}")]
    ClassificationFailed {
        #[source]
        source: Box<SuperclassError>,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Extraction (EXT_xxx)
    ExtUnsupportedExtension,
    ExtReadFailed,
    ExtMalformed,
    ExtRegistration,

    // Configuration (CFG_xxx)
    CfgMissingCredential,
    CfgMissingEndpoint,
    CfgInvalidValue,
    CfgUnsupportedProvider,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,
    NetHttpStatus,

    // Decode (DEC_xxx)
    DecInvalidJson,
    DecEmptyResponse,

    // Category (CAT_xxx)
    CatInvalidCategory,

    // Catalog (MOD_xxx)
    ModUnknownModel,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ExtUnsupportedExtension => "EXT_001",
            ErrorCode::ExtReadFailed => "EXT_002",
            ErrorCode::ExtMalformed => "EXT_003",
            ErrorCode::ExtRegistration => "EXT_004",
            ErrorCode::CfgMissingCredential => "CFG_001",
            ErrorCode::CfgMissingEndpoint => "CFG_002",
            ErrorCode::CfgInvalidValue => "CFG_003",
            ErrorCode::CfgUnsupportedProvider => "CFG_004",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::NetHttpStatus => "NET_003",
            ErrorCode::DecInvalidJson => "DEC_001",
            ErrorCode::DecEmptyResponse => "DEC_002",
            ErrorCode::CatInvalidCategory => "CAT_001",
            ErrorCode::ModUnknownModel => "MOD_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn extraction_code(err: &ExtractError) -> ErrorCode {
    match err {
        ExtractError::UnsupportedExtension(_) => ErrorCode::ExtUnsupportedExtension,
        ExtractError::Read { .. } | ExtractError::Io(_) => ErrorCode::ExtReadFailed,
        ExtractError::DuplicateExtension { .. } | ExtractError::RegistryPoisoned => {
            ErrorCode::ExtRegistration
        }
        _ => ErrorCode::ExtMalformed,
    }
}

impl SuperclassError {
    /// Wrap an extraction failure for `path`.
    pub fn extraction(path: impl Into<String>, source: ExtractError) -> Self {
        Self::ExtractionFailed {
            path: path.into(),
            code: extraction_code(&source),
            source,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            code: ErrorCode::CfgInvalidValue,
        }
    }

    /// Create a missing-credential error for a provider.
    pub fn missing_credential(provider: impl std::fmt::Display, env_var: &str) -> Self {
        Self::Configuration {
            message: format!(
                "{} backend requires an API key (set it in the model config or {})",
                provider, env_var
            ),
            code: ErrorCode::CfgMissingCredential,
        }
    }

    /// Create a missing-endpoint error for a provider.
    pub fn missing_endpoint(provider: impl std::fmt::Display) -> Self {
        Self::Configuration {
            message: format!("{} backend requires an endpoint URL", provider),
            code: ErrorCode::CfgMissingEndpoint,
        }
    }

    /// Create an unsupported provider error.
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    /// Create a transport error without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            status: None,
            vendor_code: None,
            source: None,
        }
    }

    /// Create a transport error for a non-success HTTP status.
    pub fn http_status(status: u16, vendor_code: Option<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            message: format!("HTTP {}: {}", status, message.into()),
            code: ErrorCode::NetHttpStatus,
            status: Some(status),
            vendor_code,
            source: None,
        }
    }

    /// Create a decode error, keeping the unparsed payload.
    pub fn decode(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            code: ErrorCode::DecInvalidJson,
            raw: raw.into(),
        }
    }

    /// Create an invalid category error.
    pub fn invalid_category(category: impl Into<String>, allowed: &[String]) -> Self {
        Self::InvalidCategory {
            category: category.into(),
            allowed: allowed.to_vec(),
        }
    }

    /// Create an unknown model error.
    pub fn unknown_model(model: impl Into<String>) -> Self {
        Self::UnknownModel {
            model: model.into(),
        }
    }

    /// Wrap a backend failure raised inside the pipeline.
    pub fn classification_failed(source: SuperclassError) -> Self {
        Self::ClassificationFailed {
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping pipeline wrapping layers.
    pub fn root(&self) -> &SuperclassError {
        let mut current = self;
        while let Self::ClassificationFailed { source } = current {
            current = source;
        }
        current
    }

    /// Whether the root cause is a category allow-list violation.
    pub fn is_invalid_category(&self) -> bool {
        matches!(self.root(), Self::InvalidCategory { .. })
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ExtractionFailed { code, .. } => *code,
            Self::Configuration { code, .. } => *code,
            Self::UnsupportedProvider { .. } => ErrorCode::CfgUnsupportedProvider,
            Self::Transport { code, .. } => *code,
            Self::Decode { code, .. } => *code,
            Self::InvalidCategory { .. } => ErrorCode::CatInvalidCategory,
            Self::UnknownModel { .. } => ErrorCode::ModUnknownModel,
            Self::ClassificationFailed { source } => source.code(),
            Self::Serialization(_) => ErrorCode::DecInvalidJson,
            Self::Io(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self.root() {
            Self::ExtractionFailed { code, .. } if *code == ErrorCode::ExtUnsupportedExtension => {
                Some("Check GET /formats for the list of supported file extensions")
            }
            Self::Configuration { code, .. } if *code == ErrorCode::CfgMissingCredential => {
                Some("Please check your API key and authentication credentials")
            }
            Self::Configuration { .. } => Some("Please check your model provider configuration"),
            Self::Transport { status: Some(401 | 403), .. } => {
                Some("The provider rejected the credentials; verify the API key")
            }
            Self::Transport { status: Some(429), .. } => {
                Some("Please wait before making more requests")
            }
            Self::InvalidCategory { .. } => {
                Some("Retry, or widen the allowed category list")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ExtUnsupportedExtension.as_str(), "EXT_001");
        assert_eq!(ErrorCode::CfgMissingCredential.as_str(), "CFG_001");
        assert_eq!(ErrorCode::NetConnectionFailed.as_str(), "NET_002");
        assert_eq!(ErrorCode::DecInvalidJson.as_str(), "DEC_001");
        assert_eq!(ErrorCode::CatInvalidCategory.to_string(), "CAT_001");
    }

    #[test]
    fn test_extraction_error_code() {
        let err = SuperclassError::extraction(
            "report.mp4",
            ExtractError::UnsupportedExtension(".mp4".to_string()),
        );
        assert_eq!(err.code(), ErrorCode::ExtUnsupportedExtension);
        assert!(err.to_string().contains("report.mp4"));
        assert!(err.suggestion().is_some());

        let err = SuperclassError::extraction("a.rtf", ExtractError::malformed("RTF", "bad"));
        assert_eq!(err.code(), ErrorCode::ExtMalformed);
    }

    #[test]
    fn test_root_unwraps_pipeline_layers() {
        let inner = SuperclassError::invalid_category("Sports", &["Tech".to_string()]);
        let err = SuperclassError::classification_failed(inner);

        assert!(matches!(err.root(), SuperclassError::InvalidCategory { .. }));
        assert!(err.is_invalid_category());
        assert_eq!(err.code(), ErrorCode::CatInvalidCategory);
        assert!(err.to_string().contains("invalid category 'Sports'"));
    }

    #[test]
    fn test_decode_keeps_raw_payload() {
        let err = SuperclassError::decode("expected JSON object", "Sure! Here you go");
        match err {
            SuperclassError::Decode { raw, code, .. } => {
                assert_eq!(raw, "Sure! Here you go");
                assert_eq!(code, ErrorCode::DecInvalidJson);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_http_status_error() {
        let err = SuperclassError::http_status(429, Some("rate_limit_exceeded".into()), "slow down");
        assert_eq!(err.code(), ErrorCode::NetHttpStatus);
        assert_eq!(err.suggestion(), Some("Please wait before making more requests"));
        assert!(err.to_string().contains("HTTP 429"));
    }

    #[test]
    fn test_missing_credential() {
        let err = SuperclassError::missing_credential("openai", "OPENAI_API_KEY");
        assert_eq!(err.code(), ErrorCode::CfgMissingCredential);
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
