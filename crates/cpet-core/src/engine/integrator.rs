use super::config::Strategy;
use super::context::RunContext;
use super::error::EngineError;
use super::tasks::batched::BatchedPropagator;
use super::tasks::parallel::CpuExecutor;
use crate::core::models::seed::SeedSet;
use crate::core::models::topology::TopologyResult;

/// Propagates a seed population through the field of a run and reduces every
/// streamline to its topology record.
///
/// Implementations must return exactly one record and one endtype per seed,
/// in seed order, and must never modify the charge set.
pub trait FieldIntegrator: Send + Sync {
    fn name(&self) -> &'static str;

    fn integrate(
        &self,
        context: &RunContext<'_>,
        seeds: &SeedSet,
    ) -> Result<TopologyResult, EngineError>;
}

pub fn integrator_for(strategy: Strategy) -> Box<dyn FieldIntegrator> {
    match strategy {
        Strategy::Cpu => Box::new(CpuExecutor),
        Strategy::Batched => Box::new(BatchedPropagator),
    }
}
