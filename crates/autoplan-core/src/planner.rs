//! Caller-facing facade over the scheduling engine.
//!
//! A [`Planner`] owns the collaborators and configuration, and serializes
//! the writing operations per user so two runs for the same user inside one
//! process never observe the same free slot before either commits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use crate::commitment::Commitment;
use crate::error::{ConfigError, Result};
use crate::focus::{FocusBlockDetector, FocusConfig, FocusTimeProtector};
use crate::scheduler::{ScheduleReport, SchedulerConfig, TaskScheduler};
use crate::storage::{BusyIntervalSource, CommitmentStore, Config, TaskSource};
use crate::timeline::{FocusBlock, TimeInterval, TimeSlotFinder, WorkHours};

/// Entry point for the three caller operations.
pub struct Planner {
    tasks: Arc<dyn TaskSource>,
    calendar: Arc<dyn BusyIntervalSource>,
    store: Arc<dyn CommitmentStore>,
    hours: WorkHours,
    scheduler: SchedulerConfig,
    focus: FocusConfig,
    user_locks: Mutex<UserLocks>,
}

impl Planner {
    /// Planner backed by a single store that provides every collaborator.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: TaskSource + BusyIntervalSource + CommitmentStore + 'static,
    {
        Self::from_parts(store.clone(), store.clone(), store)
    }

    pub fn from_parts(
        tasks: Arc<dyn TaskSource>,
        calendar: Arc<dyn BusyIntervalSource>,
        store: Arc<dyn CommitmentStore>,
    ) -> Self {
        Self {
            tasks,
            calendar,
            store,
            hours: WorkHours::default(),
            scheduler: SchedulerConfig::default(),
            focus: FocusConfig::default(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Apply work hours and engine settings from `config`.
    pub fn with_config(mut self, config: &Config) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        self.hours = config.work_hours()?;
        self.scheduler = config.scheduler_config();
        self.focus = config.focus_config();
        Ok(self)
    }

    pub fn with_work_hours(mut self, hours: WorkHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    pub fn with_focus_config(mut self, config: FocusConfig) -> Self {
        self.focus = config;
        self
    }

    pub fn work_hours(&self) -> WorkHours {
        self.hours
    }

    /// Focus blocks from today on that protection would reserve.
    pub fn list_focus_suggestions(&self, user_id: &str) -> Result<Vec<FocusBlock>> {
        self.list_focus_suggestions_at(user_id, Utc::now())
    }

    pub fn list_focus_suggestions_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<FocusBlock>> {
        Ok(self.detector().find_upcoming_blocks(user_id, now)?)
    }

    /// Focus blocks on the seven days starting at `week_start`, unclipped.
    pub fn find_focus_blocks(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<FocusBlock>> {
        Ok(self.detector().find_focus_blocks(user_id, week_start)?)
    }

    pub fn protect_focus_time(&self, user_id: &str) -> Result<Vec<Commitment>> {
        self.protect_focus_time_at(user_id, Utc::now())
    }

    pub fn protect_focus_time_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Commitment>> {
        self.exclusive(user_id, || {
            FocusTimeProtector::new(self.detector(), self.store.as_ref())
                .protect_focus_time_at(user_id, now)
        })
    }

    pub fn auto_schedule_tasks(&self, user_id: &str) -> Result<Vec<Commitment>> {
        self.auto_schedule_tasks_at(user_id, Utc::now())
    }

    pub fn auto_schedule_tasks_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Commitment>> {
        Ok(self.schedule_report_at(user_id, now)?.placed)
    }

    /// Like [`Planner::auto_schedule_tasks_at`], also listing skipped tasks.
    pub fn schedule_report_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<ScheduleReport> {
        self.exclusive(user_id, || {
            TaskScheduler::new(
                self.tasks.as_ref(),
                self.calendar.as_ref(),
                self.store.as_ref(),
                self.hours,
            )
            .with_config(self.scheduler)
            .run(user_id, now)
        })
    }

    /// Free slots within the work window of `date`.
    pub fn free_slots_on(&self, user_id: &str, date: NaiveDate) -> Result<Vec<TimeInterval>> {
        let Some(window) = self.hours.window_for(date) else {
            return Ok(Vec::new());
        };
        let busy = self.calendar.busy_intervals(user_id, &window)?;
        Ok(TimeSlotFinder::new()
            .with_min_slot(self.scheduler.min_slot_minutes)
            .free_slots(&window, &busy)
            .collect())
    }

    fn detector(&self) -> FocusBlockDetector<'_> {
        FocusBlockDetector::new(self.calendar.as_ref(), self.hours).with_config(self.focus)
    }

    /// Run `f` while holding the user's lock.
    ///
    /// The lock entry is dropped again once no other run for the user holds
    /// or waits on it, so the registry only holds users with a run in flight.
    fn exclusive<T>(&self, user_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.user_lock(user_id);
        let result = {
            let _guard = hold(&lock);
            f()
        };
        drop(lock);

        let mut locks = hold_map(&self.user_locks);
        if locks
            .get(user_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(user_id);
        }
        result
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        hold_map(&self.user_locks)
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

type UserLocks = HashMap<String, Arc<Mutex<()>>>;

fn hold_map(map: &Mutex<UserLocks>) -> MutexGuard<'_, UserLocks> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// A panic mid-run leaves nothing behind that the lock protects.
fn hold(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::CommitmentTag;
    use crate::storage::MemoryStore;
    use crate::task::Task;
    use chrono::TimeZone;
    use std::thread;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn span(d: u32, h1: u32, m1: u32, h2: u32, m2: u32) -> TimeInterval {
        TimeInterval::new(at(d, h1, m1), at(d, h2, m2)).unwrap()
    }

    #[test]
    fn free_slots_on_matches_worked_example() {
        let store = Arc::new(MemoryStore::new());
        store.add_event("u1", span(2, 10, 0, 11, 0), "standup").unwrap();
        store.add_event("u1", span(2, 13, 0, 13, 30), "lunch").unwrap();
        let planner = Planner::new(store);

        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let slots = planner.free_slots_on("u1", date).unwrap();
        assert_eq!(
            slots,
            vec![span(2, 9, 0, 10, 0), span(2, 11, 0, 13, 0), span(2, 13, 30, 18, 0)]
        );
    }

    #[test]
    fn suggestions_match_what_protection_reserves() {
        let store = Arc::new(MemoryStore::new());
        store.add_event("u1", span(2, 12, 0, 18, 0), "offsite").unwrap();
        let planner = Planner::new(store.clone());
        let now = at(2, 8, 0);

        let suggested = planner.list_focus_suggestions_at("u1", now).unwrap();
        let protected = planner.protect_focus_time_at("u1", now).unwrap();

        assert_eq!(suggested.len(), protected.len());
        for (block, commitment) in suggested.iter().zip(&protected) {
            assert_eq!(block.start(), commitment.start());
            assert!(block.contains(&commitment.interval));
        }
    }

    #[test]
    fn with_config_applies_work_hours() {
        let mut config = Config::default();
        config.set("work_day.start", "08:00").unwrap();
        config.set("work_day.end", "12:00").unwrap();
        let planner = Planner::new(Arc::new(MemoryStore::new()))
            .with_config(&config)
            .unwrap();

        let blocks = planner
            .find_focus_blocks("u1", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .unwrap();
        assert_eq!(blocks[0], span(2, 8, 0, 12, 0));
    }

    #[test]
    fn concurrent_runs_for_one_user_do_not_overlap() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..8 {
            store
                .add_task(Task::new("u1", format!("task {i}"), at(6, 9, 0)).with_estimate(60))
                .unwrap();
        }
        let planner = Arc::new(Planner::new(store.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let planner = Arc::clone(&planner);
                thread::spawn(move || planner.auto_schedule_tasks_at("u1", at(2, 8, 0)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let placed = store.list_commitments("u1", CommitmentTag::AutoScheduled).unwrap();
        assert_eq!(placed.len(), 32);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.interval.overlaps(&b.interval), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn user_locks_are_released_after_each_run() {
        let store = Arc::new(MemoryStore::new());
        let planner = Planner::new(store);
        for user in ["u1", "u2", "u3"] {
            planner.protect_focus_time_at(user, at(2, 8, 0)).unwrap();
            planner.auto_schedule_tasks_at(user, at(2, 8, 0)).unwrap();
        }
        assert!(hold_map(&planner.user_locks).is_empty());
    }

    #[test]
    fn oversized_focus_config_stays_inside_blocks() {
        let store = Arc::new(MemoryStore::new());
        store.add_event("u1", span(2, 11, 0, 18, 0), "offsite").unwrap();
        let planner = Planner::new(store).with_focus_config(FocusConfig {
            protect_minutes: 240,
            ..FocusConfig::default()
        });

        let created = planner.protect_focus_time_at("u1", at(2, 8, 0)).unwrap();
        assert_eq!(created[0].interval, span(2, 9, 0, 11, 0));
    }
}
