//! Server state management.

use std::sync::Arc;

use superclass_core::config::Settings;
use superclass_core::pipeline::ClassificationPipeline;

use crate::config::ServerConfig;

/// Shared application state.
///
/// Everything here is read-only after startup; each request builds its own
/// classifier backend through the pipeline.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ClassificationPipeline,
    pub settings: Arc<Settings>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(pipeline: ClassificationPipeline, settings: Settings, config: ServerConfig) -> Self {
        Self {
            pipeline,
            settings: Arc::new(settings),
            config: Arc::new(config),
        }
    }
}
