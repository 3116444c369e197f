use crate::core::models::seed::SeedSet;
use crate::core::models::topology::TopologyResult;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::integrator::FieldIntegrator;
use crate::engine::pool::WorkerPool;
use crate::engine::progress::Progress;
use crate::engine::streamline::trace;
use tracing::{info, instrument};

/// Runs one independent streamline per seed on a pool of `concurrency` workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuExecutor;

impl FieldIntegrator for CpuExecutor {
    fn name(&self) -> &'static str {
        "cpu"
    }

    #[instrument(skip_all, name = "cpu_propagation", fields(seeds = seeds.len()))]
    fn integrate(
        &self,
        context: &RunContext<'_>,
        seeds: &SeedSet,
    ) -> Result<TopologyResult, EngineError> {
        let pool = WorkerPool::acquire(context.config.concurrency)?;
        info!(
            workers = pool.width(),
            charges = context.charges.len(),
            "Tracing streamlines on the worker pool."
        );

        context.reporter.report(Progress::TaskStart {
            total: seeds.len() as u64,
        });

        let field = context.field();
        let region = context.region();
        let step_size = context.step_size();
        let ends = pool.map_ordered(seeds.seeds(), |seed| {
            let ends = trace(&field, region, seed, step_size);
            context.reporter.report(Progress::TaskIncrement);
            ends
        });

        context.reporter.report(Progress::TaskFinish);
        let ends = ends?;

        let mut result = TopologyResult::with_capacity(ends.len());
        for e in &ends {
            result.push(e.record(), e.endtype);
        }
        Ok(result)
    }
}
