use super::config::TopologyConfig;
use super::progress::ProgressReporter;
use crate::core::field::coulomb::FieldEvaluator;
use crate::core::models::charges::ChargeSet;
use crate::core::models::region::SamplingBox;

/// Everything a single topology run reads, shared immutably by every worker.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub charges: &'a ChargeSet,
    pub config: &'a TopologyConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        charges: &'a ChargeSet,
        config: &'a TopologyConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            charges,
            config,
            reporter,
        }
    }

    #[inline]
    pub fn field(&self) -> FieldEvaluator<'a> {
        FieldEvaluator::new(self.charges)
    }

    #[inline]
    pub fn region(&self) -> &'a SamplingBox {
        &self.config.region
    }

    #[inline]
    pub fn step_size(&self) -> f64 {
        self.config.step_size
    }
}
