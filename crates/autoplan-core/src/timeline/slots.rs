//! Free slot detection inside a work-day window.
//!
//! Sweeps the busy intervals of one day in start order and yields the gaps
//! between them. Overlapping busy intervals are absorbed by advancing the
//! cursor to the furthest end seen so far.

use chrono::{DateTime, Utc};

use super::interval::{BusyInterval, TimeInterval, WorkDayWindow};

/// Default minimum length of a free slot, in minutes.
pub const DEFAULT_MIN_SLOT_MINUTES: i64 = 30;

/// Finder for free slots in a day
#[derive(Debug, Clone, Copy)]
pub struct TimeSlotFinder {
    /// Minimum slot duration to report (in minutes)
    min_slot_minutes: i64,
}

impl TimeSlotFinder {
    /// Create a new finder with the default 30 minute minimum
    pub fn new() -> Self {
        Self {
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
        }
    }

    /// Set the minimum slot duration
    pub fn with_min_slot(mut self, minutes: i64) -> Self {
        self.min_slot_minutes = minutes;
        self
    }

    pub fn min_slot_minutes(&self) -> i64 {
        self.min_slot_minutes
    }

    /// Free slots of `window` not covered by any of `busy`, in start order.
    ///
    /// The returned iterator is lazy and works on its own sorted copy of
    /// `busy`; clone it to walk the same sequence again.
    pub fn free_slots(&self, window: &WorkDayWindow, busy: &[BusyInterval]) -> FreeSlots {
        let mut sorted = busy.to_vec();
        sorted.sort_by_key(|b| b.start());

        FreeSlots {
            busy: sorted,
            next: 0,
            cursor: window.start(),
            window_end: window.end(),
            min_slot_minutes: self.min_slot_minutes,
            finished: false,
        }
    }
}

impl Default for TimeSlotFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy sequence of free slots produced by [`TimeSlotFinder::free_slots`].
#[derive(Debug, Clone)]
pub struct FreeSlots {
    busy: Vec<BusyInterval>,
    next: usize,
    cursor: DateTime<Utc>,
    window_end: DateTime<Utc>,
    min_slot_minutes: i64,
    finished: bool,
}

impl FreeSlots {
    fn candidate(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<TimeInterval> {
        TimeInterval::new(start, end)
            .ok()
            .filter(|slot| slot.can_fit(self.min_slot_minutes))
    }
}

impl Iterator for FreeSlots {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        while !self.finished {
            let Some(busy) = self.busy.get(self.next).copied() else {
                // Trailing gap after the last busy interval
                self.finished = true;
                if self.cursor < self.window_end {
                    return self.candidate(self.cursor, self.window_end);
                }
                return None;
            };
            self.next += 1;

            if busy.start() >= self.window_end {
                // Nothing after this point can open a gap inside the window
                self.busy.truncate(self.next - 1);
                continue;
            }

            let gap = if self.cursor < busy.start() {
                self.candidate(self.cursor, busy.start())
            } else {
                None
            };

            if busy.end() > self.cursor {
                self.cursor = busy.end().min(self.window_end);
            }

            if gap.is_some() {
                return gap;
            }
        }
        None
    }
}

impl std::iter::FusedIterator for FreeSlots {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn span(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeInterval {
        TimeInterval::new(at(h1, m1), at(h2, m2)).unwrap()
    }

    fn work_day() -> WorkDayWindow {
        WorkDayWindow::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), span(9, 0, 18, 0))
    }

    #[test]
    fn empty_calendar_yields_whole_window() {
        let slots: Vec<_> = TimeSlotFinder::new().free_slots(&work_day(), &[]).collect();
        assert_eq!(slots, vec![span(9, 0, 18, 0)]);
    }

    #[test]
    fn finds_gaps_around_meetings() {
        let busy = vec![span(13, 0, 13, 30), span(10, 0, 11, 0)];
        let slots: Vec<_> = TimeSlotFinder::new().free_slots(&work_day(), &busy).collect();

        assert_eq!(
            slots,
            vec![span(9, 0, 10, 0), span(11, 0, 13, 0), span(13, 30, 18, 0)]
        );
        assert_eq!(slots[0].duration_minutes(), 60);
        assert_eq!(slots[1].duration_minutes(), 120);
        assert_eq!(slots[2].duration_minutes(), 270);
    }

    #[test]
    fn overlapping_busy_intervals_are_absorbed() {
        let busy = vec![span(10, 0, 12, 0), span(11, 0, 11, 30), span(11, 45, 13, 0)];
        let slots: Vec<_> = TimeSlotFinder::new().free_slots(&work_day(), &busy).collect();
        assert_eq!(slots, vec![span(9, 0, 10, 0), span(13, 0, 18, 0)]);
    }

    #[test]
    fn short_gaps_are_dropped() {
        let busy = vec![span(9, 20, 10, 0), span(10, 29, 17, 45)];
        let slots: Vec<_> = TimeSlotFinder::new().free_slots(&work_day(), &busy).collect();
        assert!(slots.is_empty());

        let slots: Vec<_> = TimeSlotFinder::new()
            .with_min_slot(15)
            .free_slots(&work_day(), &busy)
            .collect();
        assert_eq!(slots, vec![span(9, 0, 9, 20), span(10, 0, 10, 29), span(17, 45, 18, 0)]);
    }

    #[test]
    fn busy_intervals_outside_window_are_clamped() {
        let busy = vec![span(7, 0, 9, 30), span(17, 0, 20, 0), span(19, 0, 21, 0)];
        let slots: Vec<_> = TimeSlotFinder::new().free_slots(&work_day(), &busy).collect();
        assert_eq!(slots, vec![span(9, 30, 17, 0)]);
    }

    #[test]
    fn fully_booked_day_has_no_slots() {
        let busy = vec![span(8, 0, 19, 0)];
        assert_eq!(TimeSlotFinder::new().free_slots(&work_day(), &busy).count(), 0);
    }

    #[test]
    fn sequence_is_restartable_and_inputs_untouched() {
        let busy = vec![span(13, 0, 14, 0), span(10, 0, 11, 0)];
        let before = busy.clone();
        let slots = TimeSlotFinder::new().free_slots(&work_day(), &busy);

        let first: Vec<_> = slots.clone().collect();
        let second: Vec<_> = slots.collect();
        assert_eq!(first, second);
        assert_eq!(busy, before);
    }
}
