//! TOML-based application configuration.
//!
//! Stores planner preferences including:
//! - Work-day hours and UTC offset
//! - Scheduling thresholds (minimum slot, default task length, horizon)
//! - Focus block thresholds
//! - Opt-in dedupe of repeated runs
//!
//! Configuration is stored at `~/.config/autoplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::focus::FocusConfig;
use crate::scheduler::SchedulerConfig;
use crate::timeline::{WorkHours, DEFAULT_WORK_END, DEFAULT_WORK_START};

/// Work-day configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkDaySection {
    #[serde(default = "default_work_start")]
    pub start: String,
    #[serde(default = "default_work_end")]
    pub end: String,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Task scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingSection {
    #[serde(default = "default_min_slot_minutes")]
    pub min_slot_minutes: i64,
    #[serde(default = "default_task_minutes")]
    pub default_task_minutes: i64,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    #[serde(default = "default_true")]
    pub clip_to_now: bool,
    /// Skip tasks that already have an auto-scheduled commitment.
    #[serde(default)]
    pub dedupe: bool,
}

/// Focus time configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSection {
    #[serde(default = "default_focus_minutes")]
    pub min_block_minutes: i64,
    #[serde(default = "default_focus_minutes")]
    pub protect_minutes: i64,
    /// Skip blocks whose start is already protected.
    #[serde(default)]
    pub dedupe: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/autoplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub work_day: WorkDaySection,
    #[serde(default)]
    pub scheduling: SchedulingSection,
    #[serde(default)]
    pub focus: FocusSection,
}

// Default functions
fn default_work_start() -> String {
    DEFAULT_WORK_START.into()
}
fn default_work_end() -> String {
    DEFAULT_WORK_END.into()
}
fn default_min_slot_minutes() -> i64 {
    crate::timeline::DEFAULT_MIN_SLOT_MINUTES
}
fn default_task_minutes() -> i64 {
    crate::task::DEFAULT_TASK_MINUTES
}
fn default_horizon_days() -> u32 {
    crate::scheduler::DEFAULT_HORIZON_DAYS
}
fn default_focus_minutes() -> i64 {
    crate::focus::FOCUS_BLOCK_MINUTES
}
fn default_true() -> bool {
    true
}

impl Default for WorkDaySection {
    fn default() -> Self {
        Self {
            start: default_work_start(),
            end: default_work_end(),
            utc_offset_minutes: 0,
        }
    }
}

impl Default for SchedulingSection {
    fn default() -> Self {
        Self {
            min_slot_minutes: default_min_slot_minutes(),
            default_task_minutes: default_task_minutes(),
            horizon_days: default_horizon_days(),
            clip_to_now: true,
            dedupe: false,
        }
    }
}

impl Default for FocusSection {
    fn default() -> Self {
        Self {
            min_block_minutes: default_focus_minutes(),
            protect_minutes: default_focus_minutes(),
            dedupe: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(invalid("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| invalid("unknown config key".into()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<i64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".into()))?;
        }

        Err(invalid("unknown config key".into()))
    }

    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from the default location, writing defaults on first use.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path` or write and return the default if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// validated, or if the default config cannot be written to disk.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if the key is
    /// unknown or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.work_hours()?;

        let positive = [
            ("scheduling.min_slot_minutes", self.scheduling.min_slot_minutes),
            ("scheduling.default_task_minutes", self.scheduling.default_task_minutes),
            ("focus.min_block_minutes", self.focus.min_block_minutes),
            ("focus.protect_minutes", self.focus.protect_minutes),
        ];
        for (key, value) in positive {
            if value <= 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("must be positive, got {value}"),
                });
            }
        }
        if self.focus.protect_minutes > self.focus.min_block_minutes {
            return Err(ConfigError::InvalidValue {
                key: "focus.protect_minutes".to_string(),
                message: format!(
                    "must not exceed focus.min_block_minutes ({})",
                    self.focus.min_block_minutes
                ),
            });
        }
        if self.scheduling.horizon_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scheduling.horizon_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn work_hours(&self) -> Result<WorkHours, ConfigError> {
        WorkHours::parse(
            &self.work_day.start,
            &self.work_day.end,
            self.work_day.utc_offset_minutes,
        )
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            min_slot_minutes: self.scheduling.min_slot_minutes,
            default_task_minutes: self.scheduling.default_task_minutes,
            horizon_days: self.scheduling.horizon_days,
            clip_to_now: self.scheduling.clip_to_now,
            dedupe: self.scheduling.dedupe,
        }
    }

    pub fn focus_config(&self) -> FocusConfig {
        FocusConfig {
            min_slot_minutes: self.scheduling.min_slot_minutes,
            min_block_minutes: self.focus.min_block_minutes,
            protect_minutes: self.focus.protect_minutes,
            horizon_days: self.scheduling.horizon_days,
            clip_to_now: self.scheduling.clip_to_now,
            dedupe: self.focus.dedupe,
        }
    }
}
