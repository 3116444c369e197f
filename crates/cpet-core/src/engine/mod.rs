//! # Engine Module
//!
//! Executes topology runs: it owns the run configuration, the streamline
//! integrator and the execution resources (worker pool, device context).
//!
//! - **Configuration** ([`config`]) - `TopologyConfig` and its builder, strategy selection
//! - **Integration** ([`streamline`], [`integrator`]) - the per-seed Euler integrator and
//!   the `FieldIntegrator` contract shared by both executors
//! - **Executors** ([`tasks`]) - the CPU worker-pool executor and the batched propagator
//! - **Resources** ([`pool`], [`device`]) - scoped handles acquired per run
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - engine-level error types

pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod integrator;
pub mod pool;
pub mod progress;
pub mod streamline;
pub mod tasks;
