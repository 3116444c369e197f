//! # Core Module
//!
//! Stateless building blocks for electric-field topology analysis.
//!
//! - **Data Models** ([`models`]) - Charge sets, the sampling box and its frame, seeds, and
//!   topology records
//! - **Field Evaluation** ([`field`]) - Coulomb superposition in double and single precision
//! - **Geometry** ([`utils`]) - Finite-difference curvature and the distance/curvature metric
//! - **Seed Sampling** ([`sampling`]) - Random and grid seed layouts with per-seed step budgets
//! - **File I/O** ([`io`]) - Charge tables in, topology tables out
//!
//! Everything here works in the box-local frame: the box is centered at the origin and
//! its edges are aligned with the coordinate axes.

pub mod field;
pub mod io;
pub mod models;
pub mod sampling;
pub mod utils;
