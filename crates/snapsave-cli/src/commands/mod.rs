//! CLI subcommand implementations

pub mod common;
mod conflict;
mod delete;
mod list;
mod load;
mod save;

pub use conflict::run_conflict;
pub use delete::run_delete;
pub use list::run_list;
pub use load::run_load;
pub use save::run_save;
