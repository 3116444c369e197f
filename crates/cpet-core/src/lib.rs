//! # CPET Topology Library
//!
//! Characterizes the shape of an electric field inside a rectangular box by tracing
//! field lines (streamlines) from many seed points and summarizing each one by the
//! distance it travels and its mean curvature.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ChargeSet`, `SamplingBox`,
//!   `SeedSet`), the Coulomb field evaluator, the curvature metric, seed sampling and
//!   table I/O.
//!
//! - **[`engine`]: The Logic Core.** Run configuration, the single-streamline integrator,
//!   and the two execution strategies behind the `FieldIntegrator` contract: a CPU
//!   worker pool and a chunked batched propagator with early-exit filtering.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into complete
//!   runs: frame transformation, charge filtering, seeding and topology computation.

pub mod core;
pub mod engine;
pub mod workflows;
