//! Server configuration loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use superclass_core::catalog::ModelConstraints;
use superclass_core::error::{SuperclassError, SuperclassResult};

/// Default upload staging directory.
pub const DEFAULT_UPLOAD_DIR: &str = "/tmp/superclass-uploads";
/// Default request body limit (32 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 << 20;

/// HTTP front end settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory uploads are staged in while they are classified.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Default input cost ceiling per 1K tokens for `/models/recommend`.
    pub max_cost: f64,
    /// Default latency ceiling for `/models/recommend`, in seconds.
    pub max_latency_secs: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_cost: 0.1,
            max_latency_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load from `SUPERCLASS_HOST`, `PORT`, `UPLOAD_DIR`, `MAX_UPLOAD_BYTES`,
    /// `MAX_COST` and `MAX_LATENCY`.
    pub fn from_env() -> SuperclassResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup; unset or blank values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> SuperclassResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(host) = get("SUPERCLASS_HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(dir) = get("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(limit) = get("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", &limit)?;
        }
        if let Some(cost) = get("MAX_COST") {
            config.max_cost = parse_var("MAX_COST", &cost)?;
        }
        if let Some(latency) = get("MAX_LATENCY") {
            config.max_latency_secs = parse_var("MAX_LATENCY", &latency)?;
        }

        Ok(config)
    }

    /// Bind address, `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Recommendation constraints used when a request leaves them unset.
    pub fn default_constraints(&self) -> ModelConstraints {
        ModelConstraints {
            max_cost_per_thousand_tokens: self.max_cost,
            max_latency_ms: self.max_latency_secs.saturating_mul(1000),
            required_capabilities: Vec::new(),
            min_token_limit: 0,
        }
    }
}

fn parse_var<T>(key: &str, value: &str) -> SuperclassResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| {
        SuperclassError::configuration(format!("Invalid value for {}: '{}' ({})", key, value, e))
    })
}
