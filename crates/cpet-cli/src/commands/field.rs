use super::load_charges;
use crate::cli::FieldArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use cpet::workflows::field::{PointField, point_field};
use tracing::info;

pub fn run(args: FieldArgs) -> Result<()> {
    let field = evaluate(&args)?;
    println!(
        "Field at box center (box axes):    [{:.6}, {:.6}, {:.6}] V/Å",
        field.local.x, field.local.y, field.local.z
    );
    println!(
        "Field at box center (global axes): [{:.6}, {:.6}, {:.6}] V/Å",
        field.global.x, field.global.y, field.global.z
    );
    println!("Magnitude: {:.6} V/Å", field.magnitude);
    Ok(())
}

fn evaluate(args: &FieldArgs) -> Result<PointField> {
    let resolved = PartialRunConfig::from_file(&args.input.config)?.merge_with_input_args(&args.input)?;
    let charges = load_charges(&args.input.charges)?;
    info!("Evaluating the field at the box center...");
    Ok(point_field(
        &charges,
        &resolved.job.preparation,
        &resolved.config.region,
    ))
}
