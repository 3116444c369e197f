use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::error::ModelError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("A streamline worker failed: {0}")]
    WorkerFailed(String),

    #[error(
        "Device memory exhausted: requested {requested} bytes with {available} bytes available; \
         reduce batch_frequency"
    )]
    DeviceMemoryExhausted { requested: usize, available: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
