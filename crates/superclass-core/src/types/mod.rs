//! Core types for superclass.

mod classification;
mod model_config;
mod provider;

pub use classification::*;
pub use model_config::*;
pub use provider::Provider;
