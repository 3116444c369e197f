pub mod field;
pub mod topo;

use crate::error::{CliError, Result};
use cpet::core::io::{charges::ChargeTable, traits::TableFile};
use cpet::core::models::charges::ChargeSet;
use std::path::Path;
use tracing::{info, warn};

/// Reads the charge table, attaching the path to any parse failure.
pub(crate) fn load_charges(path: &Path) -> Result<ChargeSet> {
    info!("Loading charges from {:?}", path);
    let charges = ChargeTable::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    if charges.is_empty() {
        warn!("Charge table {:?} has no rows.", path);
    }
    info!(
        charges = charges.len(),
        net_charge = charges.net_charge(),
        "Charges loaded."
    );
    Ok(charges)
}
