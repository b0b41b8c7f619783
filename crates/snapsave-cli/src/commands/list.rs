use std::path::Path;

use serde::Serialize;

use crate::commands::common::{format_timestamp, open_service};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SlotListItem {
    name: String,
    description: Option<String>,
    last_modified_ms: i64,
    content_length: u64,
}

pub async fn run_list(limit: usize, as_json: bool, data_dir: &Path) -> Result<(), CliError> {
    let service = open_service(data_dir)?;
    let slots = service.list_slots(limit).await?;

    if as_json {
        let items = slots
            .iter()
            .map(|slot| SlotListItem {
                name: slot.name.to_string(),
                description: slot.description.clone(),
                last_modified_ms: slot.last_modified_ms,
                content_length: slot.content_length,
            })
            .collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if slots.is_empty() {
        println!("No save slots.");
        return Ok(());
    }
    for slot in &slots {
        println!(
            "{}  {:>10}B  {}  {}",
            format_timestamp(slot.last_modified_ms),
            slot.content_length,
            slot.name,
            slot.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
