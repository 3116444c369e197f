//! Readers and writers for the tabular files a topology run consumes and produces.

pub mod charges;
pub mod error;
pub mod topology;
pub mod traits;
