use std::path::Path;

use snapsave_core::SlotName;

use crate::commands::common::open_service;
use crate::error::CliError;

pub async fn run_delete(slot: &str, data_dir: &Path) -> Result<(), CliError> {
    let name: SlotName = slot.parse().map_err(CliError::Core)?;
    let service = open_service(data_dir)?;
    service.delete_slot(&name).await?;
    tracing::info!(slot = %name, "slot deleted");
    println!("Deleted '{name}'");
    Ok(())
}
