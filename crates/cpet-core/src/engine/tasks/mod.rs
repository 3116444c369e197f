//! The two executors behind [`FieldIntegrator`](crate::engine::integrator::FieldIntegrator).
//!
//! [`parallel`] traces one streamline per worker task in double precision.
//! [`batched`] advances the whole seed population together in single-precision
//! chunks and retires samples as they stop.

pub mod batched;
pub mod parallel;
