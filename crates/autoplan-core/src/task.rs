//! Task backlog types.
//!
//! Tasks are created and mutated by collaborators outside the scheduling
//! engine. The engine only reads pending tasks with a future due date and
//! never changes their status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default task length when no usable estimate is present (minutes).
pub const DEFAULT_TASK_MINUTES: i64 = 60;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be worked on; eligible for auto-scheduling
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// A unit of work in a user's backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Expected effort in minutes. Missing or non-positive values fall back
    /// to the configured default.
    pub estimated_minutes: Option<i64>,
    /// Higher is more urgent.
    pub priority: i32,
    pub due_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a pending task with priority 0 and no estimate.
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        due_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            description: None,
            estimated_minutes: None,
            priority: 0,
            due_at,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, minutes: i64) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Minutes to reserve for this task.
    pub fn scheduled_minutes(&self, default_minutes: i64) -> i64 {
        match self.estimated_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => default_minutes,
        }
    }

    /// Pending with a due date after `now`.
    pub fn is_schedulable(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.due_at > now
    }
}

/// Placement order: priority descending, then due date ascending.
pub fn sort_by_placement_order(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.due_at.cmp(&b.due_at))
    });
}
