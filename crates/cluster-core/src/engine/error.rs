use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::layout::LayoutError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Failed to build worker thread pool: {0}")]
    ThreadPool(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl From<LayoutError> for EngineError {
    fn from(e: LayoutError) -> Self {
        EngineError::InvalidLayout {
            reason: e.to_string(),
        }
    }
}
