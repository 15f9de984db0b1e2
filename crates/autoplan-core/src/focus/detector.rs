use chrono::{DateTime, NaiveDate, Utc};

use super::FocusConfig;
use crate::error::DataAccessError;
use crate::storage::BusyIntervalSource;
use crate::timeline::{FocusBlock, TimeSlotFinder, WorkDayWindow, WorkHours};

/// Finds free slots long enough for deep work.
pub struct FocusBlockDetector<'a> {
    calendar: &'a dyn BusyIntervalSource,
    hours: WorkHours,
    config: FocusConfig,
}

impl<'a> FocusBlockDetector<'a> {
    pub fn new(calendar: &'a dyn BusyIntervalSource, hours: WorkHours) -> Self {
        Self {
            calendar,
            hours,
            config: FocusConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FocusConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    /// Focus blocks on the 7 days starting at `week_start`, in day order
    /// then slot order.
    ///
    /// The horizon is not aligned to calendar weeks and whole work windows
    /// are searched, including any part already in the past.
    pub fn find_focus_blocks(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<FocusBlock>, DataAccessError> {
        let windows = self.hours.horizon(week_start, self.config.horizon_days);
        self.blocks_in(user_id, &windows)
    }

    /// Focus blocks from today on, as seen at `now`.
    pub fn find_upcoming_blocks(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<FocusBlock>, DataAccessError> {
        let windows = self
            .hours
            .upcoming(now, self.config.horizon_days, self.config.clip_to_now);
        self.blocks_in(user_id, &windows)
    }

    fn blocks_in(
        &self,
        user_id: &str,
        windows: &[WorkDayWindow],
    ) -> Result<Vec<FocusBlock>, DataAccessError> {
        let finder = TimeSlotFinder::new().with_min_slot(self.config.min_slot_minutes);
        let mut blocks = Vec::new();

        for window in windows {
            let busy = self.calendar.busy_intervals(user_id, window)?;
            blocks.extend(
                finder
                    .free_slots(window, &busy)
                    .filter(|slot| slot.can_fit(self.config.min_block_minutes)),
            );
        }

        tracing::debug!(user_id, blocks = blocks.len(), "focus blocks detected");
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::timeline::TimeInterval;
    use chrono::{Duration, TimeZone};

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn span(d: u32, h1: u32, m1: u32, h2: u32, m2: u32) -> TimeInterval {
        TimeInterval::new(at(d, h1, m1), at(d, h2, m2)).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn empty_week_yields_one_block_per_day() {
        let store = MemoryStore::new();
        let blocks = FocusBlockDetector::new(&store, WorkHours::default())
            .find_focus_blocks("u1", monday())
            .unwrap();

        assert_eq!(blocks.len(), 7);
        assert_eq!(blocks[0], span(2, 9, 0, 18, 0));
        assert_eq!(blocks[6], span(8, 9, 0, 18, 0));
    }

    #[test]
    fn keeps_only_slots_of_two_hours_or_more() {
        let store = MemoryStore::new();
        store.add_event("u1", span(2, 10, 0, 11, 0), "standup").unwrap();
        store.add_event("u1", span(2, 13, 0, 13, 30), "lunch").unwrap();
        store.add_event("u1", span(2, 15, 0, 18, 0), "review").unwrap();

        let blocks = FocusBlockDetector::new(&store, WorkHours::default())
            .find_focus_blocks("u1", monday())
            .unwrap();

        // 09:00-10:00 and 13:30-15:00 are too short
        assert_eq!(blocks[0], span(2, 11, 0, 13, 0));
        assert_eq!(blocks[1], span(3, 9, 0, 18, 0));
        for block in &blocks {
            assert!(block.duration_minutes() >= 120);
        }
    }

    #[test]
    fn week_start_is_not_aligned_to_calendar_weeks() {
        let store = MemoryStore::new();
        let thursday = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let blocks = FocusBlockDetector::new(&store, WorkHours::default())
            .find_focus_blocks("u1", thursday)
            .unwrap();

        assert_eq!(blocks.first().unwrap().start(), at(5, 9, 0));
        assert_eq!(blocks.last().unwrap().start(), at(11, 9, 0));
    }

    #[test]
    fn upcoming_blocks_ignore_elapsed_time() {
        let store = MemoryStore::new();
        let now = at(2, 16, 30) + Duration::seconds(5);
        let blocks = FocusBlockDetector::new(&store, WorkHours::default())
            .find_upcoming_blocks("u1", now)
            .unwrap();

        // 16:31-18:00 on Monday is under two hours
        assert_eq!(blocks.len(), 6);
        assert_eq!(blocks[0], span(3, 9, 0, 18, 0));
    }
}
