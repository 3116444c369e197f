use crate::core::models::region::SamplingBox;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_STEP_SIZE: f64 = 0.1;
pub const DEFAULT_N_SAMPLES: usize = 10_000;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_BATCH_FREQUENCY: usize = 100;

/// Smallest chunk window: two carried rows plus at least one new row.
pub const MIN_BATCH_FREQUENCY: usize = 3;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which executor propagates the seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One streamline per task on a fixed-width worker pool.
    #[default]
    Cpu,
    /// All seeds advanced together in chunked single-precision batches.
    Batched,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Cpu => write!(f, "cpu"),
            Strategy::Batched => write!(f, "batched"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Strategy::Cpu),
            "batched" | "gpu" => Ok(Strategy::Batched),
            other => Err(ConfigError::InvalidParameter {
                name: "strategy",
                reason: format!("unknown strategy '{}', expected 'cpu' or 'batched'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyConfig {
    pub step_size: f64,
    pub n_samples: usize,
    pub region: SamplingBox,
    pub concurrency: usize,
    pub batch_frequency: usize,
    pub strategy: Strategy,
    /// Byte budget for the batched executor's device buffers. `None` means unbounded.
    pub device_memory_limit: Option<usize>,
}

impl TopologyConfig {
    /// Step count needed to cross the box diagonal twice at this step size.
    pub fn max_steps(&self) -> usize {
        self.region.max_steps(self.step_size)
    }
}

#[derive(Default)]
pub struct TopologyConfigBuilder {
    step_size: Option<f64>,
    n_samples: Option<usize>,
    dimensions: Option<[f64; 3]>,
    concurrency: Option<usize>,
    batch_frequency: Option<usize>,
    strategy: Option<Strategy>,
    device_memory_limit: Option<usize>,
}

impl TopologyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_size(mut self, step_size: f64) -> Self {
        self.step_size = Some(step_size);
        self
    }
    pub fn n_samples(mut self, n: usize) -> Self {
        self.n_samples = Some(n);
        self
    }
    /// Half-extents of the box along its local x, y and z axes.
    pub fn dimensions(mut self, dimensions: [f64; 3]) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = Some(workers);
        self
    }
    pub fn batch_frequency(mut self, window: usize) -> Self {
        self.batch_frequency = Some(window);
        self
    }
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn device_memory_limit(mut self, bytes: usize) -> Self {
        self.device_memory_limit = Some(bytes);
        self
    }

    pub fn build(self) -> Result<TopologyConfig, ConfigError> {
        let dimensions = self
            .dimensions
            .ok_or(ConfigError::MissingParameter("dimensions"))?;
        let region =
            SamplingBox::from_array(dimensions).map_err(|e| ConfigError::InvalidParameter {
                name: "dimensions",
                reason: e.to_string(),
            })?;

        let step_size = self.step_size.unwrap_or(DEFAULT_STEP_SIZE);
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "step_size",
                reason: format!("must be positive and finite, got {}", step_size),
            });
        }

        let n_samples = self.n_samples.unwrap_or(DEFAULT_N_SAMPLES);
        if n_samples == 0 {
            return Err(positive("n_samples"));
        }

        let concurrency = self.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(positive("concurrency"));
        }

        let batch_frequency = self.batch_frequency.unwrap_or(DEFAULT_BATCH_FREQUENCY);
        if batch_frequency < MIN_BATCH_FREQUENCY {
            return Err(ConfigError::InvalidParameter {
                name: "batch_frequency",
                reason: format!(
                    "must be at least {}, got {}",
                    MIN_BATCH_FREQUENCY, batch_frequency
                ),
            });
        }

        Ok(TopologyConfig {
            step_size,
            n_samples,
            region,
            concurrency,
            batch_frequency,
            strategy: self.strategy.unwrap_or_default(),
            device_memory_limit: self.device_memory_limit,
        })
    }
}

fn positive(name: &'static str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: "must be greater than zero".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults() {
        let config = TopologyConfigBuilder::new()
            .dimensions([1.0, 2.0, 3.0])
            .build()
            .unwrap();
        assert_eq!(config.step_size, DEFAULT_STEP_SIZE);
        assert_eq!(config.n_samples, DEFAULT_N_SAMPLES);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.batch_frequency, DEFAULT_BATCH_FREQUENCY);
        assert_eq!(config.strategy, Strategy::Cpu);
        assert_eq!(config.device_memory_limit, None);
    }

    #[test]
    fn build_fails_without_dimensions() {
        let result = TopologyConfigBuilder::new().step_size(0.5).build();
        assert_eq!(result, Err(ConfigError::MissingParameter("dimensions")));
    }

    #[test]
    fn build_rejects_invalid_values() {
        let base = || TopologyConfigBuilder::new().dimensions([1.0, 1.0, 1.0]);
        let name_of = |r: Result<TopologyConfig, ConfigError>| match r {
            Err(ConfigError::InvalidParameter { name, .. }) => name,
            other => panic!("expected InvalidParameter, got {:?}", other),
        };

        assert_eq!(name_of(base().step_size(0.0).build()), "step_size");
        assert_eq!(name_of(base().step_size(f64::NAN).build()), "step_size");
        assert_eq!(name_of(base().n_samples(0).build()), "n_samples");
        assert_eq!(name_of(base().concurrency(0).build()), "concurrency");
        assert_eq!(name_of(base().batch_frequency(2).build()), "batch_frequency");
        assert_eq!(
            name_of(
                TopologyConfigBuilder::new()
                    .dimensions([1.0, -1.0, 1.0])
                    .build()
            ),
            "dimensions"
        );
    }

    #[test]
    fn max_steps_follows_box_diagonal() {
        let config = TopologyConfigBuilder::new()
            .dimensions([3.0, 4.0, 12.0])
            .step_size(0.5)
            .build()
            .unwrap();
        assert_eq!(config.max_steps(), 52);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("CPU".parse::<Strategy>().unwrap(), Strategy::Cpu);
        assert_eq!("batched".parse::<Strategy>().unwrap(), Strategy::Batched);
        assert_eq!("gpu".parse::<Strategy>().unwrap(), Strategy::Batched);
        assert!("fpga".parse::<Strategy>().is_err());
    }
}
