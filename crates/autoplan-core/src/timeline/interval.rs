//! Plain interval value types shared by every component.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A half-open `[start, end)` range of instants with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end)
    }
}

/// A time range already occupied by a commitment. May arrive unsorted and
/// overlapping.
pub type BusyInterval = TimeInterval;

/// A free interval long enough for deep work. Only lives for one detection call.
pub type FocusBlock = TimeInterval;

impl TimeInterval {
    /// Create an interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval of `minutes` starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self, ValidationError> {
        Self::new(start, start + Duration::minutes(minutes))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this interval can hold `minutes` of work
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes() >= minutes
    }

    /// Whether the two intervals share any instant.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Round `t` up to the next whole minute.
pub fn ceil_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    if secs.rem_euclid(60) == 0 && t.timestamp_subsec_nanos() == 0 {
        return t;
    }
    DateTime::from_timestamp((secs.div_euclid(60) + 1) * 60, 0).unwrap_or(t)
}

/// The schedulable portion of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDayWindow {
    pub date: NaiveDate,
    pub interval: TimeInterval,
}

impl WorkDayWindow {
    pub fn new(date: NaiveDate, interval: TimeInterval) -> Self {
        Self { date, interval }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }

    /// Drop the part of the window that lies before `now`.
    ///
    /// Returns `None` once the whole window has elapsed.
    pub fn clipped_to(&self, now: DateTime<Utc>) -> Option<Self> {
        if now <= self.start() {
            return Some(*self);
        }
        TimeInterval::new(now, self.end())
            .ok()
            .map(|interval| Self::new(self.date, interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert!(TimeInterval::new(at(9, 0), at(9, 0)).is_err());
        assert_eq!(
            TimeInterval::new(at(10, 0), at(9, 0)),
            Err(ValidationError::InvalidTimeRange {
                start: at(10, 0),
                end: at(9, 0)
            })
        );
    }

    #[test]
    fn overlap_is_half_open() {
        let a = TimeInterval::new(at(9, 0), at(10, 0)).unwrap();
        let b = TimeInterval::new(at(10, 0), at(11, 0)).unwrap();
        let c = TimeInterval::new(at(9, 30), at(10, 30)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn deserialize_validates_ordering() {
        let ok = r#"{"start":"2026-03-02T09:00:00Z","end":"2026-03-02T10:00:00Z"}"#;
        let bad = r#"{"start":"2026-03-02T10:00:00Z","end":"2026-03-02T09:00:00Z"}"#;
        let parsed: TimeInterval = serde_json::from_str(ok).unwrap();
        assert_eq!(parsed.duration_minutes(), 60);
        assert!(serde_json::from_str::<TimeInterval>(bad).is_err());
    }

    #[test]
    fn ceil_to_minute_rounds_up_partial_minutes() {
        assert_eq!(ceil_to_minute(at(9, 0)), at(9, 0));
        assert_eq!(ceil_to_minute(at(9, 0) + Duration::seconds(1)), at(9, 1));
        assert_eq!(ceil_to_minute(at(9, 59) + Duration::milliseconds(10)), at(10, 0));
    }

    #[test]
    fn clipping_window_to_now() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let window = WorkDayWindow::new(date, TimeInterval::new(at(9, 0), at(18, 0)).unwrap());

        assert_eq!(window.clipped_to(at(8, 0)), Some(window));
        assert_eq!(window.clipped_to(at(12, 0)).unwrap().start(), at(12, 0));
        assert!(window.clipped_to(at(18, 0)).is_none());
        assert!(window.clipped_to(at(20, 0)).is_none());
    }
}
