//! Subcommand handlers and the state they share.

pub mod config;
pub mod event;
pub mod focus;
pub mod schedule;
pub mod slots;
pub mod task;

use std::path::PathBuf;
use std::sync::Arc;

use autoplan_core::{Config, Planner, PlannerDb, TimeInterval};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Global options resolved once in `main`.
pub struct Context {
    pub user: String,
    pub db_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub now: Option<String>,
}

impl Context {
    pub fn open_db(&self) -> Result<Arc<PlannerDb>, autoplan_core::CoreError> {
        let db = match &self.db_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "opening database");
                PlannerDb::open_at(path)?
            }
            None => {
                tracing::debug!("opening default database");
                PlannerDb::open()?
            }
        };
        Ok(Arc::new(db))
    }

    pub fn config_path(&self) -> Result<PathBuf, autoplan_core::ConfigError> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }

    pub fn load_config(&self) -> Result<Config, autoplan_core::ConfigError> {
        let path = self.config_path()?;
        tracing::debug!(path = %path.display(), user = %self.user, "loading config");
        Config::load_from(&path)
    }

    pub fn planner(&self) -> Result<Planner, Box<dyn std::error::Error>> {
        let config = self.load_config()?;
        Ok(Planner::new(self.open_db()?).with_config(&config)?)
    }

    pub fn now(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        match &self.now {
            Some(raw) => parse_instant(raw),
            None => Ok(Utc::now()),
        }
    }
}

pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_interval(interval: &TimeInterval) -> String {
    format!(
        "{} - {} ({}m)",
        interval.start().format("%Y-%m-%d %H:%M"),
        interval.end().format("%H:%M"),
        interval.duration_minutes()
    )
}
