//! Commitments: persisted occupied time ranges on a user's calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::timeline::TimeInterval;

/// Origin of a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitmentTag {
    /// Entered by the user or synced from their calendar
    #[serde(rename = "user")]
    User,
    /// Placed by the task scheduler
    #[serde(rename = "auto-scheduled")]
    AutoScheduled,
    /// Reserved by the focus time protector
    #[serde(rename = "focus-time")]
    FocusTime,
}

impl CommitmentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentTag::User => "user",
            CommitmentTag::AutoScheduled => "auto-scheduled",
            CommitmentTag::FocusTime => "focus-time",
        }
    }
}

impl fmt::Display for CommitmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitmentTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(CommitmentTag::User),
            "auto-scheduled" => Ok(CommitmentTag::AutoScheduled),
            "focus-time" => Ok(CommitmentTag::FocusTime),
            other => Err(format!("unknown commitment tag: {other}")),
        }
    }
}

/// A commitment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommitment {
    pub interval: TimeInterval,
    pub title: String,
    pub tag: CommitmentTag,
    pub linked_task_id: Option<String>,
}

impl NewCommitment {
    pub fn new(interval: TimeInterval, title: impl Into<String>, tag: CommitmentTag) -> Self {
        Self {
            interval,
            title: title.into(),
            tag,
            linked_task_id: None,
        }
    }

    pub fn linked_to(mut self, task_id: impl Into<String>) -> Self {
        self.linked_task_id = Some(task_id.into());
        self
    }
}

/// A persisted commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: String,
    pub user_id: String,
    pub interval: TimeInterval,
    pub title: String,
    pub tag: CommitmentTag,
    pub linked_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Commitment {
    /// Materialize `new` with a fresh id.
    pub fn from_new(user_id: impl Into<String>, new: NewCommitment) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            interval: new.interval,
            title: new.title,
            tag: new.tag,
            linked_task_id: new.linked_task_id,
            created_at: Utc::now(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.interval.duration_minutes()
    }
}
