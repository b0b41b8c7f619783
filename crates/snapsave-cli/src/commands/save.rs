use std::path::Path;

use snapsave_core::{SlotName, SnapshotMetadataChange};

use crate::commands::common::{format_timestamp, open_service, read_input};
use crate::error::CliError;

pub async fn run_save(
    slot: Option<&str>,
    new: bool,
    input: Option<&Path>,
    description: Option<String>,
    cover: Option<&Path>,
    data_dir: &Path,
) -> Result<(), CliError> {
    let name = match (slot, new) {
        (Some(slot), false) => slot.parse().map_err(CliError::Core)?,
        (None, true) => {
            let name = SlotName::generate("save").map_err(CliError::Core)?;
            tracing::info!(slot = %name, "generated unique slot name");
            name
        }
        (Some(_), true) => return Err(CliError::SlotNameAndNew),
        (None, false) => return Err(CliError::MissingSlotName),
    };

    let bytes = read_input(input)?;
    let mut change = SnapshotMetadataChange::new();
    if let Some(description) = description {
        change = change.with_description(description);
    }
    if let Some(cover) = cover {
        change = change.with_cover_image(std::fs::read(cover)?);
    }

    let service = open_service(data_dir)?;
    let confirmation = service.save_slot(&name, bytes, change).await?;
    tracing::info!(
        slot = %confirmation.slot,
        revision = %confirmation.revision,
        "save committed"
    );

    println!(
        "Saved '{}' at {}",
        confirmation.slot,
        format_timestamp(confirmation.committed_at_ms)
    );
    Ok(())
}
