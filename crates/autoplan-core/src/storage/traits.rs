use crate::commitment::{Commitment, CommitmentTag, NewCommitment};
use crate::error::DataAccessError;
use crate::task::Task;
use crate::timeline::{BusyInterval, WorkDayWindow};

/// Commitments already on a user's calendar.
pub trait BusyIntervalSource: Send + Sync {
    /// Busy intervals overlapping `window`, ordered by start.
    fn busy_intervals(
        &self,
        user_id: &str,
        window: &WorkDayWindow,
    ) -> Result<Vec<BusyInterval>, DataAccessError>;
}

/// The user's task backlog.
pub trait TaskSource: Send + Sync {
    /// All pending tasks of the user. Callers still filter on due date.
    fn pending_tasks(&self, user_id: &str) -> Result<Vec<Task>, DataAccessError>;
}

/// Write side for commitments. Performs no dedupe or overlap check.
pub trait CommitmentStore: Send + Sync {
    /// Persist a new commitment for `user_id`.
    fn create_commitment(
        &self,
        user_id: &str,
        commitment: NewCommitment,
    ) -> Result<Commitment, DataAccessError>;

    /// Existing commitments of the user carrying `tag`.
    fn list_commitments(
        &self,
        user_id: &str,
        tag: CommitmentTag,
    ) -> Result<Vec<Commitment>, DataAccessError>;
}
