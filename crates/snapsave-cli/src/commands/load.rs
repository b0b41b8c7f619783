use std::path::Path;

use snapsave_core::SlotName;

use crate::commands::common::{open_service, write_output};
use crate::error::CliError;

pub async fn run_load(slot: &str, output: Option<&Path>, data_dir: &Path) -> Result<(), CliError> {
    let name: SlotName = slot.parse().map_err(CliError::Core)?;
    let service = open_service(data_dir)?;

    let loaded = service.load_slot(&name).await?;
    write_output(output, &loaded.bytes)?;

    if let Some(output) = output {
        println!(
            "Loaded {} bytes from '{}' into {}",
            loaded.bytes.len(),
            name,
            output.display()
        );
    }
    Ok(())
}
