//! # Core Models Module
//!
//! Plain data structures shared by every layer of the crate: the charge set, the
//! sampling box and its frame, seeds, and per-streamline topology records.
//!
//! ## Key Components
//!
//! - [`charges`] - Immutable point-charge set in the box-local frame
//! - [`region`] - Origin-centered sampling box and its containment test
//! - [`frame`] - Orthonormal box frame for moving global coordinates into the local frame
//! - [`seed`] - Streamline starting points and their step budgets
//! - [`topology`] - Endtypes and the (distance, curvature) output records
//! - [`error`] - Validation errors raised while constructing models
//!
//! All coordinates held by these types are in the box-local frame unless a type
//! says otherwise (`BoxFrame` is the only one that speaks both frames).

pub mod charges;
pub mod error;
pub mod frame;
pub mod region;
pub mod seed;
pub mod topology;
