use std::path::Path;

use snapsave_core::SlotName;

use crate::commands::common::{open_store, read_input};
use crate::error::CliError;

pub fn run_conflict(
    slot: &str,
    input: Option<&Path>,
    description: Option<String>,
    data_dir: &Path,
) -> Result<(), CliError> {
    let name: SlotName = slot.parse().map_err(CliError::Core)?;
    let store = open_store(data_dir)?;

    let bytes = read_input(input)?;
    let handle = store.inject_conflict(&name, &bytes, description)?;

    println!(
        "Injected conflicting revision {} into '{name}'; the next load will resolve it",
        handle.revision
    );
    Ok(())
}
