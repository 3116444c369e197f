//! # Workflows Module
//!
//! End-to-end entry points that tie `core` and `engine` together.
//!
//! - **Charge Preparation** ([`prepare`]) - radius and in-box filters, the move into the
//!   box frame and the optional box shift
//! - **Topology** ([`topology`]) - seeding, strategy dispatch and the ordered
//!   `(distance, mean_curvature)` table
//! - **Point Field** ([`field`]) - the field vector and magnitude at the box center

pub mod field;
pub mod prepare;
pub mod topology;
