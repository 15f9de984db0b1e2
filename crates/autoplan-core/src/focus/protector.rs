use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::{FocusBlockDetector, FOCUS_TIME_TITLE};
use crate::commitment::{Commitment, CommitmentTag, NewCommitment};
use crate::error::Result;
use crate::storage::CommitmentStore;
use crate::timeline::TimeInterval;

/// Reserves a fixed-length focus-time commitment at the start of every
/// detected focus block.
///
/// Only the first `protect_minutes` of a block are reserved; the rest of a
/// longer block stays free. A block shorter than `protect_minutes` is
/// reserved whole. Without `dedupe`, running twice against a
/// calendar that does not reflect the first run's writes reserves the same
/// time twice.
pub struct FocusTimeProtector<'a> {
    detector: FocusBlockDetector<'a>,
    store: &'a dyn CommitmentStore,
}

impl<'a> FocusTimeProtector<'a> {
    pub fn new(detector: FocusBlockDetector<'a>, store: &'a dyn CommitmentStore) -> Self {
        Self { detector, store }
    }

    /// Protect focus time from now on.
    pub fn protect_focus_time(&self, user_id: &str) -> Result<Vec<Commitment>> {
        self.protect_focus_time_at(user_id, Utc::now())
    }

    /// Protect focus time as if the current instant were `now`.
    ///
    /// # Errors
    /// The first data-access failure aborts the run. Commitments created
    /// before the failure stay persisted.
    pub fn protect_focus_time_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Commitment>> {
        let result = self.protect(user_id, now);
        match &result {
            Ok(created) => {
                tracing::info!(user_id, protected = created.len(), "focus time protected")
            }
            Err(e) => tracing::warn!(user_id, error = %e, "focus protection aborted"),
        }
        result
    }

    fn protect(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Commitment>> {
        let config = *self.detector.config();
        let blocks = self.detector.find_upcoming_blocks(user_id, now)?;

        let already: HashSet<DateTime<Utc>> = if config.dedupe {
            self.store
                .list_commitments(user_id, CommitmentTag::FocusTime)?
                .iter()
                .map(|c| c.start())
                .collect()
        } else {
            HashSet::new()
        };

        let mut created = Vec::new();
        for block in blocks {
            if already.contains(&block.start()) {
                tracing::debug!(start = %block.start(), "focus block already protected");
                continue;
            }
            // Never reserve past the end of the free block
            let minutes = config.protect_minutes.min(block.duration_minutes());
            let interval = TimeInterval::starting_at(block.start(), minutes)?;
            created.push(self.store.create_commitment(
                user_id,
                NewCommitment::new(interval, FOCUS_TIME_TITLE, CommitmentTag::FocusTime),
            )?);
        }
        Ok(created)
    }
}
