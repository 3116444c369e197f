use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Charge set has {positions} positions but {charges} charge values")]
    ChargeLengthMismatch { positions: usize, charges: usize },

    #[error("Seed list has {points} points but {budgets} step budgets")]
    SeedLengthMismatch { points: usize, budgets: usize },

    #[error("Seed {index} has a zero step budget; budgets must be positive")]
    ZeroStepBudget { index: usize },

    #[error("Box half-extents must be positive and finite, got ({0}, {1}, {2})")]
    InvalidHalfExtents(f64, f64, f64),

    #[error("Cannot build a box frame: {0}")]
    DegenerateFrame(&'static str),
}
