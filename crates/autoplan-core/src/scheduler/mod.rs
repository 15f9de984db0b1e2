//! Automatic scheduler for pending tasks.
//!
//! This module places a user's backlog into free time:
//! - Orders pending, not-yet-due tasks by priority, then due date
//! - Scans a rolling horizon of work days, earliest first
//! - Puts each task into the first free slot long enough to hold it
//! - Persists one auto-scheduled commitment per placed task
//!
//! Placement is a single greedy pass. A task that fits nowhere in the
//! horizon is skipped without error, and earlier placements are never
//! revisited to make room for later ones.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commitment::{Commitment, CommitmentTag, NewCommitment};
use crate::error::Result;
use crate::storage::{BusyIntervalSource, CommitmentStore, TaskSource};
use crate::task::{sort_by_placement_order, Task, DEFAULT_TASK_MINUTES};
use crate::timeline::{
    TimeInterval, TimeSlotFinder, WorkDayWindow, WorkHours, DEFAULT_MIN_SLOT_MINUTES,
};

/// Number of days, starting today, searched for free time.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Free gaps shorter than this are ignored (minutes)
    pub min_slot_minutes: i64,
    /// Length used for tasks without a usable estimate (minutes)
    pub default_task_minutes: i64,
    /// Days searched, starting today
    pub horizon_days: u32,
    /// Never place work before the current instant
    pub clip_to_now: bool,
    /// Skip tasks that already have an auto-scheduled commitment
    pub dedupe: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
            default_task_minutes: DEFAULT_TASK_MINUTES,
            horizon_days: DEFAULT_HORIZON_DAYS,
            clip_to_now: true,
            dedupe: false,
        }
    }
}

/// Outcome of one scheduling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Commitments created, in placement order
    pub placed: Vec<Commitment>,
    /// Ids of tasks for which no slot was found
    pub unscheduled: Vec<String>,
}

/// Greedy first-fit scheduler for a user's task backlog.
pub struct TaskScheduler<'a> {
    tasks: &'a dyn TaskSource,
    calendar: &'a dyn BusyIntervalSource,
    store: &'a dyn CommitmentStore,
    hours: WorkHours,
    config: SchedulerConfig,
}

impl<'a> TaskScheduler<'a> {
    /// Create a scheduler with default config
    pub fn new(
        tasks: &'a dyn TaskSource,
        calendar: &'a dyn BusyIntervalSource,
        store: &'a dyn CommitmentStore,
        hours: WorkHours,
    ) -> Self {
        Self {
            tasks,
            calendar,
            store,
            hours,
            config: SchedulerConfig::default(),
        }
    }

    /// Replace the config
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Schedule the user's pending tasks starting from the current instant.
    pub fn schedule_tasks(&self, user_id: &str) -> Result<Vec<Commitment>> {
        self.schedule_tasks_at(user_id, Utc::now())
    }

    /// Schedule the user's pending tasks as if the current instant were `now`.
    pub fn schedule_tasks_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Commitment>> {
        Ok(self.run(user_id, now)?.placed)
    }

    /// Run one scheduling pass and report placed and skipped tasks.
    ///
    /// # Errors
    /// The first data-access failure aborts the run. Commitments created
    /// before the failure stay persisted.
    pub fn run(&self, user_id: &str, now: DateTime<Utc>) -> Result<ScheduleReport> {
        let result = self.place_backlog(user_id, now);
        match &result {
            Ok(report) => tracing::info!(
                user_id,
                placed = report.placed.len(),
                unscheduled = report.unscheduled.len(),
                "auto-scheduling finished"
            ),
            Err(e) => tracing::warn!(user_id, error = %e, "auto-scheduling aborted"),
        }
        result
    }

    fn place_backlog(&self, user_id: &str, now: DateTime<Utc>) -> Result<ScheduleReport> {
        let backlog = self.backlog(user_id, now)?;
        let windows =
            self.hours
                .upcoming(now, self.config.horizon_days, self.config.clip_to_now);
        let mut report = ScheduleReport::default();

        for task in backlog {
            let minutes = task.scheduled_minutes(self.config.default_task_minutes);

            match self.first_fit(user_id, &windows, &report.placed, minutes)? {
                Some(start) => {
                    let interval = TimeInterval::starting_at(start, minutes)?;
                    let commitment = self.store.create_commitment(
                        user_id,
                        NewCommitment::new(
                            interval,
                            task.title.clone(),
                            CommitmentTag::AutoScheduled,
                        )
                        .linked_to(task.id.clone()),
                    )?;
                    tracing::debug!(
                        task_id = %task.id,
                        start = %commitment.start(),
                        minutes,
                        "placed task"
                    );
                    report.placed.push(commitment);
                }
                None => {
                    tracing::debug!(task_id = %task.id, minutes, "no free slot in horizon");
                    report.unscheduled.push(task.id);
                }
            }
        }

        Ok(report)
    }

    /// Pending tasks due after `now`, in placement order.
    fn backlog(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .pending_tasks(user_id)?
            .into_iter()
            .filter(|t| t.is_schedulable(now))
            .collect();

        if self.config.dedupe {
            let already: HashSet<String> = self
                .store
                .list_commitments(user_id, CommitmentTag::AutoScheduled)?
                .into_iter()
                .filter_map(|c| c.linked_task_id)
                .collect();
            tasks.retain(|t| !already.contains(&t.id));
        }

        sort_by_placement_order(&mut tasks);
        Ok(tasks)
    }

    /// Start of the earliest free slot able to hold `minutes`.
    ///
    /// Busy time is re-read for every day and widened with the commitments
    /// placed earlier in this run, so the answer holds even when the
    /// calendar source does not see fresh writes.
    fn first_fit(
        &self,
        user_id: &str,
        windows: &[WorkDayWindow],
        placed: &[Commitment],
        minutes: i64,
    ) -> Result<Option<DateTime<Utc>>> {
        let finder = TimeSlotFinder::new().with_min_slot(self.config.min_slot_minutes);

        for window in windows {
            let mut busy = self.calendar.busy_intervals(user_id, window)?;
            busy.extend(
                placed
                    .iter()
                    .map(|c| c.interval)
                    .filter(|i| i.overlaps(&window.interval)),
            );

            if let Some(slot) = finder.free_slots(window, &busy).find(|s| s.can_fit(minutes)) {
                return Ok(Some(slot.start()));
            }
        }
        Ok(None)
    }
}
