mod config;
mod memory;
pub mod migrations;
pub mod planner_db;
mod traits;

pub use config::{Config, FocusSection, SchedulingSection, WorkDaySection};
pub use memory::MemoryStore;
pub use planner_db::PlannerDb;
pub use traits::{BusyIntervalSource, CommitmentStore, TaskSource};

use std::path::PathBuf;

/// Returns `~/.config/autoplan[-dev]/` based on AUTOPLAN_ENV.
///
/// Set AUTOPLAN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("AUTOPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("autoplan-dev")
    } else {
        base_dir.join("autoplan")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
