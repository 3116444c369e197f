use crate::core::models::error::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid value on row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Invalid table contents: {0}")]
    Model(#[from] ModelError),
}
