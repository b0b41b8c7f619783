use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::commands::common::{format_timestamp, open_store, read_input};
use crate::commands::{run_conflict, run_delete, run_list, run_load, run_save};
use crate::error::CliError;
use snapsave_core::store::SnapshotStore;
use snapsave_core::{OpenOutcome, SlotName};

fn data_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[test]
fn format_timestamp_renders_utc() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
}

#[test]
fn format_timestamp_falls_back_to_raw_ms() {
    assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
}

#[test]
fn read_input_reads_file() {
    let dir = data_dir();
    let path = dir.path().join("input.bin");
    fs::write(&path, b"payload").unwrap();
    assert_eq!(read_input(Some(&path)).unwrap(), b"payload");
}

#[tokio::test]
async fn save_then_load_round_trip() {
    let dir = data_dir();
    let input = dir.path().join("in.bin");
    let output = dir.path().join("out.bin");
    fs::write(&input, b"save state").unwrap();

    run_save(
        Some("campaign"),
        false,
        Some(&input),
        Some("Level 2".to_string()),
        None,
        dir.path(),
    )
    .await
    .unwrap();

    run_load("campaign", Some(&output), dir.path()).await.unwrap();
    assert_eq!(fs::read(&output).unwrap(), b"save state");
}

#[tokio::test]
async fn save_new_generates_unique_slot_name() {
    let dir = data_dir();
    let input = dir.path().join("in.bin");
    fs::write(&input, b"fresh run").unwrap();

    run_save(None, true, Some(&input), None, None, dir.path())
        .await
        .unwrap();

    let store = open_store(dir.path()).unwrap();
    let slots = store.list_slots(5).unwrap();
    assert_eq!(slots.len(), 1);
    assert!(slots[0].name.as_str().starts_with("save-"));
    assert_eq!(slots[0].content_length, 9);
}

#[tokio::test]
async fn save_requires_slot_name_or_new() {
    let dir = data_dir();
    let result = run_save(None, false, None, None, None, dir.path()).await;
    assert!(matches!(result, Err(CliError::MissingSlotName)));

    let result = run_save(Some("slot"), true, None, None, None, dir.path()).await;
    assert!(matches!(result, Err(CliError::SlotNameAndNew)));
}

#[tokio::test]
async fn injected_conflict_resolves_to_newer_revision_on_load() {
    let dir = data_dir();
    let base = dir.path().join("base.bin");
    let divergent = dir.path().join("divergent.bin");
    let output = dir.path().join("out.bin");
    fs::write(&base, b"old").unwrap();
    fs::write(&divergent, b"new").unwrap();

    run_save(Some("campaign"), false, Some(&base), None, None, dir.path())
        .await
        .unwrap();
    run_conflict("campaign", Some(&divergent), None, dir.path()).unwrap();

    // The injected revision is the newer writer, so the load keeps it.
    run_load("campaign", Some(&output), dir.path()).await.unwrap();
    assert_eq!(fs::read(&output).unwrap(), b"new");

    // The conflict is fully settled afterwards.
    let store = open_store(dir.path()).unwrap();
    let name: SlotName = "campaign".parse().unwrap();
    assert!(matches!(
        store.open(&name, false).unwrap(),
        OpenOutcome::Success(_)
    ));
}

#[tokio::test]
async fn delete_then_list_is_empty() {
    let dir = data_dir();
    let input = dir.path().join("in.bin");
    fs::write(&input, b"bytes").unwrap();

    run_save(Some("campaign"), false, Some(&input), None, None, dir.path())
        .await
        .unwrap();
    run_delete("campaign", dir.path()).await.unwrap();
    run_list(5, false, dir.path()).await.unwrap();

    let store = open_store(dir.path()).unwrap();
    assert!(store.list_slots(5).unwrap().is_empty());
}
