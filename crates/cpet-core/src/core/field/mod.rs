//! Electrostatic field evaluation over point-charge sets.
//!
//! [`coulomb`] holds the double-precision [`coulomb::FieldEvaluator`] used by the
//! sequential integrator and the single-precision kernel the batched propagator
//! fuses across all samples of a step.

pub mod coulomb;
