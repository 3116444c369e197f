use clap::{Args, Parser, Subcommand};
use cpet::core::sampling::{BudgetInit, Initializer};
use cpet::engine::config::Strategy;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "CPET CLI - electric field topology analysis by streamline tracing inside a sampling box.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used by the batched executor.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trace streamlines from random or gridded seeds and write the topology table.
    Topo(TopoArgs),
    /// Print the electric field vector and magnitude at the box center.
    Field(FieldArgs),
}

/// Inputs shared by every command: the charges and the run configuration.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the charge table (CSV with columns x,y,z,charge).
    #[arg(short = 'i', long, required = true, value_name = "PATH")]
    pub charges: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override the box half-extents from the config file.
    #[arg(long, num_args = 3, value_names = ["LX", "LY", "LZ"])]
    pub dimensions: Option<Vec<f64>>,

    /// Remove charges lying strictly inside the box, overriding the config file.
    #[arg(long)]
    pub filter_in_box: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S topology.step-size=0.05
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `topo` subcommand.
#[derive(Args, Debug)]
pub struct TopoArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path for the output topology table (space-delimited distance and curvature).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    // --- Topology Overrides ---
    /// Override the Euler step size, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub step_size: Option<f64>,

    /// Override the number of seeds.
    #[arg(short, long, value_name = "INT")]
    pub n_samples: Option<usize>,

    /// Override the executor ('cpu' or 'batched').
    #[arg(long, value_name = "NAME")]
    pub strategy: Option<Strategy>,

    /// Override the worker count of the CPU executor.
    #[arg(long, value_name = "INT")]
    pub concurrency: Option<usize>,

    /// Override the chunk window of the batched executor (at least 3).
    #[arg(long, value_name = "INT")]
    pub batch_frequency: Option<usize>,

    // --- Seeding Overrides ---
    /// Override the seed layout ('random' or 'uniform').
    #[arg(long, value_name = "NAME")]
    pub initializer: Option<Initializer>,

    /// Override how step budgets are drawn ('true-rand' or 'fixed-rand').
    #[arg(long, value_name = "NAME")]
    pub max_steps_init: Option<BudgetInit>,

    /// Seed the random number generator for reproducible seeds.
    #[arg(long, value_name = "INT")]
    pub rng_seed: Option<u64>,
}

/// Arguments for the `field` subcommand.
#[derive(Args, Debug)]
pub struct FieldArgs {
    #[command(flatten)]
    pub input: InputArgs,
}
