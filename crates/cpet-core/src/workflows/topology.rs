use super::prepare::{ChargePreparation, prepare_charges};
use crate::core::models::charges::ChargeSet;
use crate::core::models::seed::SeedSet;
use crate::core::models::topology::{Endtype, TopologyResult};
use crate::core::sampling::SeedingPlan;
use crate::engine::config::TopologyConfig;
use crate::engine::context::RunContext;
use crate::engine::error::EngineError;
use crate::engine::integrator::integrator_for;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument, warn};

/// Everything needed to go from raw charges to a topology table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopologyJob {
    pub preparation: ChargePreparation,
    pub seeding: SeedingPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyRun {
    /// Charges as they were used, in the box-local frame.
    pub charges: ChargeSet,
    pub seeds: SeedSet,
    pub result: TopologyResult,
}

/// Traces one streamline per seed and reduces each to `(distance, mean_curvature)`.
///
/// `charges` and `seeds` must already be in the box-local frame. The executor
/// is chosen by `config.strategy`; rows of the result follow seed order.
#[instrument(skip_all, name = "topology_computation", fields(strategy = %config.strategy))]
pub fn compute_topology(
    charges: &ChargeSet,
    seeds: &SeedSet,
    config: &TopologyConfig,
    reporter: &ProgressReporter,
) -> Result<TopologyResult, EngineError> {
    if seeds.is_empty() {
        warn!("No seeds to propagate. Returning an empty topology table.");
        return Ok(TopologyResult::default());
    }
    if charges.is_empty() {
        warn!("Charge set is empty; every streamline will stay at its seed.");
    }

    let integrator = integrator_for(config.strategy);
    let context = RunContext::new(charges, config, reporter);
    let result = reporter.phase("Streamline Tracing", || {
        integrator.integrate(&context, seeds)
    })?;

    if result.len() != seeds.len() {
        return Err(EngineError::Internal(format!(
            "{} executor returned {} records for {} seeds",
            integrator.name(),
            result.len(),
            seeds.len()
        )));
    }

    info!(
        seeds = seeds.len(),
        exited_box = result.count_endtype(Endtype::ExitedBox),
        max_steps_reached = result.count_endtype(Endtype::MaxStepsReached),
        "Topology computation finished."
    );
    Ok(result)
}

/// Prepares charges, draws seeds and computes the topology table.
#[instrument(skip_all, name = "topology_workflow")]
pub fn run(
    global_charges: &ChargeSet,
    job: &TopologyJob,
    config: &TopologyConfig,
    reporter: &ProgressReporter,
) -> Result<TopologyRun, EngineError> {
    let (charges, seeds) = reporter.phase("Preparation", || -> Result<_, EngineError> {
        let charges = prepare_charges(global_charges, &job.preparation, &config.region);
        let seeds = job
            .seeding
            .generate(&config.region, config.n_samples, config.max_steps())?;
        Ok((charges, seeds))
    })?;
    info!(
        charges = charges.len(),
        seeds = seeds.len(),
        max_steps = config.max_steps(),
        "Run prepared."
    );

    let result = compute_topology(&charges, &seeds, config, reporter)?;
    Ok(TopologyRun {
        charges,
        seeds,
        result,
    })
}
