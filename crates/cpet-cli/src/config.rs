use crate::cli::{InputArgs, TopoArgs};
use crate::error::{CliError, Result};
use cpet::core::models::frame::BoxFrame;
use cpet::core::sampling::{BudgetInit, Initializer, SeedingPlan};
use cpet::engine::config::{self as core_config, Strategy, TopologyConfig};
use cpet::workflows::prepare::ChargePreparation;
use cpet::workflows::topology::TopologyJob;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialTopologySection {
    step_size: Option<f64>,
    n_samples: Option<usize>,
    dimensions: Option<[f64; 3]>,
    strategy: Option<Strategy>,
    concurrency: Option<usize>,
    batch_frequency: Option<usize>,
    device_memory_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFrameSection {
    center: Option<[f64; 3]>,
    x_axis_point: Option<[f64; 3]>,
    y_axis_point: Option<[f64; 3]>,
    filter_in_box: Option<bool>,
    filter_radius: Option<f64>,
    box_shift: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSeedingSection {
    initializer: Option<Initializer>,
    max_steps_init: Option<BudgetInit>,
    rng_seed: Option<u64>,
}

/// The config file as written, before CLI overrides and defaults are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    topology: Option<PartialTopologySection>,
    frame: Option<PartialFrameSection>,
    seeding: Option<PartialSeedingSection>,
}

/// A fully resolved run: engine configuration plus the charge and seed setup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    pub config: TopologyConfig,
    pub job: TopologyJob,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolves a `topo` run. Dedicated flags win over `--set` values, which win over the file.
    pub fn merge_with_topo_args(mut self, args: &TopoArgs) -> Result<ResolvedRun> {
        self.apply_set_values(&args.input.set_values)?;

        let topology = self.topology.get_or_insert_with(Default::default);
        overlay(&mut topology.step_size, args.step_size);
        overlay(&mut topology.n_samples, args.n_samples);
        overlay(&mut topology.strategy, args.strategy);
        overlay(&mut topology.concurrency, args.concurrency);
        overlay(&mut topology.batch_frequency, args.batch_frequency);

        let seeding = self.seeding.get_or_insert_with(Default::default);
        overlay(&mut seeding.initializer, args.initializer);
        overlay(&mut seeding.max_steps_init, args.max_steps_init);
        overlay(&mut seeding.rng_seed, args.rng_seed);

        self.resolve(&args.input)
    }

    /// Resolves a run that only needs the box and the charge preparation.
    pub fn merge_with_input_args(mut self, args: &InputArgs) -> Result<ResolvedRun> {
        self.apply_set_values(&args.set_values)?;
        self.resolve(args)
    }

    fn resolve(self, args: &InputArgs) -> Result<ResolvedRun> {
        let topology = self.topology.unwrap_or_default();
        let frame = self.frame.unwrap_or_default();
        let seeding = self.seeding.unwrap_or_default();

        let dimensions = match &args.dimensions {
            Some(values) => Some(Self::dimensions_from_cli(values)?),
            None => topology.dimensions,
        }
        .ok_or_else(|| {
            CliError::Config(
                "`topology.dimensions` is required either in the config file or via --dimensions."
                    .to_string(),
            )
        })?;

        let mut builder = core_config::TopologyConfigBuilder::new().dimensions(dimensions);
        if let Some(v) = topology.step_size {
            builder = builder.step_size(v);
        }
        if let Some(v) = topology.n_samples {
            builder = builder.n_samples(v);
        }
        if let Some(v) = topology.strategy {
            builder = builder.strategy(v);
        }
        if let Some(v) = topology.concurrency {
            builder = builder.concurrency(v);
        }
        if let Some(v) = topology.batch_frequency {
            builder = builder.batch_frequency(v);
        }
        if let Some(v) = topology.device_memory_limit {
            builder = builder.device_memory_limit(v);
        }
        let config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let preparation = Self::merge_frame(frame, args.filter_in_box)?;
        let seeding = SeedingPlan {
            initializer: seeding.initializer.unwrap_or_default(),
            budget_init: seeding.max_steps_init.unwrap_or_default(),
            rng_seed: seeding.rng_seed,
        };

        Ok(ResolvedRun {
            config,
            job: TopologyJob {
                preparation,
                seeding,
            },
        })
    }

    fn dimensions_from_cli(values: &[f64]) -> Result<[f64; 3]> {
        <[f64; 3]>::try_from(values).map_err(|_| {
            CliError::Argument(format!(
                "--dimensions takes exactly three values, got {}",
                values.len()
            ))
        })
    }

    fn merge_frame(frame: PartialFrameSection, cli_filter_in_box: bool) -> Result<ChargePreparation> {
        let center = Point3::from(frame.center.unwrap_or([0.0; 3]));
        let x_point = frame
            .x_axis_point
            .map(Point3::from)
            .unwrap_or(center + Vector3::x());
        let y_point = frame
            .y_axis_point
            .map(Point3::from)
            .unwrap_or(center + Vector3::y());
        let box_frame = BoxFrame::from_axis_points(center, x_point, y_point)
            .map_err(|e| CliError::Config(e.to_string()))?;

        if let Some(radius) = frame.filter_radius {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(CliError::Config(format!(
                    "`frame.filter-radius` must be positive, got {}",
                    radius
                )));
            }
        }

        Ok(ChargePreparation {
            frame: box_frame,
            filter_radius: frame.filter_radius,
            filter_in_box: cli_filter_in_box || frame.filter_in_box.unwrap_or(false),
            box_shift: Vector3::from(frame.box_shift.unwrap_or([0.0; 3])),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            let value_str = value_str.trim();

            match key {
                "topology.step-size" => {
                    self.topology_mut().step_size = Some(parse_value(key, value_str)?)
                }
                "topology.n-samples" => {
                    self.topology_mut().n_samples = Some(parse_value(key, value_str)?)
                }
                "topology.strategy" => {
                    self.topology_mut().strategy = Some(parse_value(key, value_str)?)
                }
                "topology.concurrency" => {
                    self.topology_mut().concurrency = Some(parse_value(key, value_str)?)
                }
                "topology.batch-frequency" => {
                    self.topology_mut().batch_frequency = Some(parse_value(key, value_str)?)
                }
                "topology.device-memory-limit" => {
                    self.topology_mut().device_memory_limit = Some(parse_value(key, value_str)?)
                }
                "frame.filter-in-box" => {
                    self.frame_mut().filter_in_box = Some(parse_value(key, value_str)?)
                }
                "frame.filter-radius" => {
                    self.frame_mut().filter_radius = Some(parse_value(key, value_str)?)
                }
                "seeding.initializer" => {
                    self.seeding_mut().initializer = Some(parse_value(key, value_str)?)
                }
                "seeding.max-steps-init" => {
                    self.seeding_mut().max_steps_init = Some(parse_value(key, value_str)?)
                }
                "seeding.rng-seed" => {
                    self.seeding_mut().rng_seed = Some(parse_value(key, value_str)?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn topology_mut(&mut self) -> &mut PartialTopologySection {
        self.topology.get_or_insert_with(Default::default)
    }

    fn frame_mut(&mut self) -> &mut PartialFrameSection {
        self.frame.get_or_insert_with(Default::default)
    }

    fn seeding_mut(&mut self) -> &mut PartialSeedingSection {
        self.seeding.get_or_insert_with(Default::default)
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn parse_value<T>(key: &str, value_str: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value_str
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value_str, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use cpet::core::models::error::ModelError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_CONFIG: &str = r#"
[topology]
step-size = 0.05
n-samples = 500
dimensions = [1.5, 1.5, 1.5]
strategy = "batched"
concurrency = 8
batch-frequency = 50
device-memory-limit = 1048576

[frame]
center = [10.0, 0.0, 0.0]
x-axis-point = [11.0, 0.0, 0.0]
y-axis-point = [10.0, 1.0, 0.0]
filter-in-box = true
filter-radius = 20.0
box-shift = [0.0, 0.0, 0.5]

[seeding]
initializer = "uniform"
max-steps-init = "fixed-rand"
rng-seed = 7
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn topo_args(extra: &[&str]) -> TopoArgs {
        let mut argv = vec!["cpet", "topo", "-i", "c.csv", "-c", "r.toml", "-o", "o.top"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Topo(args) => args,
            Commands::Field(_) => panic!("expected 'topo' subcommand"),
        }
    }

    #[test]
    fn full_file_resolves_every_section() {
        let file = write_config(FULL_CONFIG);
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let run = partial.merge_with_topo_args(&topo_args(&[])).unwrap();

        assert_eq!(run.config.step_size, 0.05);
        assert_eq!(run.config.n_samples, 500);
        assert_eq!(run.config.strategy, Strategy::Batched);
        assert_eq!(run.config.concurrency, 8);
        assert_eq!(run.config.batch_frequency, 50);
        assert_eq!(run.config.device_memory_limit, Some(1_048_576));
        assert_eq!(run.config.region.half_extents(), &Vector3::new(1.5, 1.5, 1.5));

        let prep = &run.job.preparation;
        assert_eq!(prep.frame.center(), &Point3::new(10.0, 0.0, 0.0));
        assert!(prep.filter_in_box);
        assert_eq!(prep.filter_radius, Some(20.0));
        assert_eq!(prep.box_shift, Vector3::new(0.0, 0.0, 0.5));

        assert_eq!(run.job.seeding.initializer, Initializer::Uniform);
        assert_eq!(run.job.seeding.budget_init, BudgetInit::FixedRand);
        assert_eq!(run.job.seeding.rng_seed, Some(7));
    }

    #[test]
    fn minimal_file_falls_back_to_defaults() {
        let file = write_config("[topology]\ndimensions = [2.0, 2.0, 2.0]\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let run = partial.merge_with_topo_args(&topo_args(&[])).unwrap();

        assert_eq!(run.config.step_size, core_config::DEFAULT_STEP_SIZE);
        assert_eq!(run.config.n_samples, core_config::DEFAULT_N_SAMPLES);
        assert_eq!(run.config.strategy, Strategy::Cpu);
        assert_eq!(run.job.preparation.frame, BoxFrame::identity());
        assert!(!run.job.preparation.filter_in_box);
        assert_eq!(run.job.seeding, SeedingPlan::default());
    }

    #[test]
    fn cli_flags_and_set_values_override_the_file() {
        let file = write_config(FULL_CONFIG);
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let args = topo_args(&[
            "--step-size",
            "0.2",
            "--strategy",
            "cpu",
            "--dimensions",
            "3",
            "4",
            "12",
            "-S",
            "topology.n-samples=42",
            "-S",
            "seeding.rng-seed=99",
        ]);
        let run = partial.merge_with_topo_args(&args).unwrap();

        assert_eq!(run.config.step_size, 0.2);
        assert_eq!(run.config.strategy, Strategy::Cpu);
        assert_eq!(run.config.n_samples, 42);
        assert_eq!(run.config.region.half_extents(), &Vector3::new(3.0, 4.0, 12.0));
        assert_eq!(run.job.seeding.rng_seed, Some(99));
    }

    #[test]
    fn dedicated_flag_wins_over_set_value() {
        let file = write_config("[topology]\ndimensions = [1.0, 1.0, 1.0]\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let args = topo_args(&["--concurrency", "2", "-S", "topology.concurrency=16"]);
        let run = partial.merge_with_topo_args(&args).unwrap();
        assert_eq!(run.config.concurrency, 2);
    }

    #[test]
    fn missing_dimensions_is_a_config_error() {
        let file = write_config("[topology]\nstep-size = 0.1\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let result = partial.merge_with_topo_args(&topo_args(&[]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("dimensions")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("[topology]\ndimensions = [1.0, 1.0, 1.0]\nstep = 0.1\n");
        let result = PartialRunConfig::from_file(file.path());
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn unsupported_set_key_is_rejected() {
        let file = write_config("[topology]\ndimensions = [1.0, 1.0, 1.0]\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let result = partial.merge_with_topo_args(&topo_args(&["-S", "topology.colour=blue"]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("topology.colour")));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let file = write_config("[topology]\ndimensions = [1.0, 1.0, 1.0]\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();

        let no_equals = partial.merge_with_topo_args(&topo_args(&["-S", "topology.step-size"]));
        assert!(matches!(no_equals, Err(CliError::Config(msg)) if msg.contains("KEY=VALUE")));

        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let bad_number = partial.merge_with_topo_args(&topo_args(&["-S", "topology.step-size=fast"]));
        assert!(matches!(bad_number, Err(CliError::Config(msg)) if msg.contains("'fast'")));
    }

    #[test]
    fn builder_validation_surfaces_as_config_error() {
        let file = write_config("[topology]\ndimensions = [1.0, 1.0, 1.0]\nbatch-frequency = 2\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let result = partial.merge_with_topo_args(&topo_args(&[]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("batch_frequency")));
    }

    #[test]
    fn degenerate_frame_is_rejected() {
        let file = write_config(
            "[topology]\ndimensions = [1.0, 1.0, 1.0]\n[frame]\ncenter = [1.0, 2.0, 3.0]\nx-axis-point = [1.0, 2.0, 3.0]\n",
        );
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let result = partial.merge_with_topo_args(&topo_args(&[]));
        let expected = ModelError::DegenerateFrame("x-axis point coincides with center").to_string();
        assert!(matches!(result, Err(CliError::Config(msg)) if msg == expected));
    }

    #[test]
    fn filter_in_box_flag_enables_filter_for_field_runs() {
        let file = write_config("[topology]\ndimensions = [1.0, 1.0, 1.0]\n");
        let partial = PartialRunConfig::from_file(file.path()).unwrap();
        let args = match Cli::parse_from([
            "cpet", "field", "-i", "c.csv", "-c", "r.toml", "--filter-in-box",
        ])
        .command
        {
            Commands::Field(args) => args,
            Commands::Topo(_) => panic!("expected 'field' subcommand"),
        };
        let run = partial.merge_with_input_args(&args.input).unwrap();
        assert!(run.job.preparation.filter_in_box);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = PartialRunConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
