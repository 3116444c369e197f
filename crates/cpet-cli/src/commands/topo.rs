use super::load_charges;
use crate::cli::TopoArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use cpet::core::io::{topology::TopologyTable, traits::TableFile};
use cpet::core::models::topology::Endtype;
use cpet::engine::progress::ProgressReporter;
use cpet::workflows;
use tracing::info;

pub fn run(args: TopoArgs, quiet: bool) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.input.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let resolved = partial_config.merge_with_topo_args(&args)?;
    info!(
        strategy = %resolved.config.strategy,
        step_size = resolved.config.step_size,
        n_samples = resolved.config.n_samples,
        "Configuration resolved."
    );

    let charges = load_charges(&args.input.charges)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    if !quiet {
        println!("Tracing streamlines with the {} executor...", resolved.config.strategy);
    }
    let outcome = workflows::topology::run(&charges, &resolved.job, &resolved.config, &reporter)?;

    info!("Writing topology table to {:?}", &args.output);
    TopologyTable::write_to_path(&outcome.result.records, &args.output).map_err(|e| {
        CliError::FileWriting {
            path: args.output.clone(),
            source: e.into(),
        }
    })?;

    if !quiet {
        println!(
            "✓ {} streamlines ({} exited the box, {} ran out of steps) written to: {}",
            outcome.result.len(),
            outcome.result.count_endtype(Endtype::ExitedBox),
            outcome.result.count_endtype(Endtype::MaxStepsReached),
            args.output.display()
        );
    }
    Ok(())
}
