use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] snapsave_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("A slot name is required (or pass --new to generate one)")]
    MissingSlotName,
    #[error("Pass either a slot name or --new, not both")]
    SlotNameAndNew,
}
