//! In-process store implementing every collaborator trait.

use std::sync::{Mutex, MutexGuard};

use super::traits::{BusyIntervalSource, CommitmentStore, TaskSource};
use crate::commitment::{Commitment, CommitmentTag, NewCommitment};
use crate::error::DataAccessError;
use crate::task::{Task, TaskStatus};
use crate::timeline::{BusyInterval, WorkDayWindow};

#[derive(Debug, Default)]
struct State {
    tasks: Vec<Task>,
    commitments: Vec<Commitment>,
}

/// Tasks and commitments held in memory.
///
/// Every commitment, whatever its tag, counts as busy time for its user.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DataAccessError> {
        self.state.lock().map_err(|_| DataAccessError::Locked)
    }

    pub fn add_task(&self, task: Task) -> Result<(), DataAccessError> {
        self.lock()?.tasks.push(task);
        Ok(())
    }

    /// Add a user-created commitment.
    pub fn add_event(
        &self,
        user_id: &str,
        interval: crate::timeline::TimeInterval,
        title: &str,
    ) -> Result<Commitment, DataAccessError> {
        self.create_commitment(
            user_id,
            NewCommitment::new(interval, title, CommitmentTag::User),
        )
    }

    /// Every commitment of the user, in start order.
    pub fn commitments(&self, user_id: &str) -> Result<Vec<Commitment>, DataAccessError> {
        let mut found: Vec<_> = self
            .lock()?
            .commitments
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| c.start());
        Ok(found)
    }
}

impl BusyIntervalSource for MemoryStore {
    fn busy_intervals(
        &self,
        user_id: &str,
        window: &WorkDayWindow,
    ) -> Result<Vec<BusyInterval>, DataAccessError> {
        let mut busy: Vec<_> = self
            .lock()?
            .commitments
            .iter()
            .filter(|c| c.user_id == user_id && c.interval.overlaps(&window.interval))
            .map(|c| c.interval)
            .collect();
        busy.sort_by_key(|b| b.start());
        Ok(busy)
    }
}

impl TaskSource for MemoryStore {
    fn pending_tasks(&self, user_id: &str) -> Result<Vec<Task>, DataAccessError> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id && t.status == TaskStatus::Pending)
            .cloned()
            .collect())
    }
}

impl CommitmentStore for MemoryStore {
    fn create_commitment(
        &self,
        user_id: &str,
        commitment: NewCommitment,
    ) -> Result<Commitment, DataAccessError> {
        let created = Commitment::from_new(user_id, commitment);
        self.lock()?.commitments.push(created.clone());
        Ok(created)
    }

    fn list_commitments(
        &self,
        user_id: &str,
        tag: CommitmentTag,
    ) -> Result<Vec<Commitment>, DataAccessError> {
        Ok(self
            .commitments(user_id)?
            .into_iter()
            .filter(|c| c.tag == tag)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimeInterval;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
    }

    #[test]
    fn busy_intervals_are_scoped_to_user_and_window() {
        let store = MemoryStore::new();
        store.add_event("u1", TimeInterval::new(at(2, 14), at(2, 15)).unwrap(), "b").unwrap();
        store.add_event("u1", TimeInterval::new(at(2, 10), at(2, 11)).unwrap(), "a").unwrap();
        store
            .add_event("u1", TimeInterval::new(at(3, 10), at(3, 11)).unwrap(), "next day")
            .unwrap();
        store.add_event("u2", TimeInterval::new(at(2, 12), at(2, 13)).unwrap(), "other").unwrap();

        let window = WorkDayWindow::new(
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            TimeInterval::new(at(2, 9), at(2, 18)).unwrap(),
        );
        let busy = store.busy_intervals("u1", &window).unwrap();
        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0].start(), at(2, 10));
        assert_eq!(busy[1].start(), at(2, 14));
    }

    #[test]
    fn pending_tasks_excludes_other_statuses() {
        let store = MemoryStore::new();
        store.add_task(Task::new("u1", "open", at(5, 9))).unwrap();
        let mut done = Task::new("u1", "closed", at(5, 9));
        done.status = TaskStatus::Done;
        store.add_task(done).unwrap();

        let pending = store.pending_tasks("u1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "open");
    }

    #[test]
    fn list_commitments_filters_by_tag() {
        let store = MemoryStore::new();
        let slot = TimeInterval::new(at(2, 9), at(2, 11)).unwrap();
        store.add_event("u1", slot, "meeting").unwrap();
        store
            .create_commitment(
                "u1",
                NewCommitment::new(slot, "Focus time", CommitmentTag::FocusTime),
            )
            .unwrap();

        let focus = store.list_commitments("u1", CommitmentTag::FocusTime).unwrap();
        assert_eq!(focus.len(), 1);
        assert_eq!(focus[0].title, "Focus time");
    }
}
