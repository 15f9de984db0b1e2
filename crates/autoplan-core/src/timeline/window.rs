//! Work-day windows derived from fixed local working hours.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use super::interval::{ceil_to_minute, TimeInterval, WorkDayWindow};
use crate::error::ConfigError;

pub const DEFAULT_WORK_START: &str = "09:00";
pub const DEFAULT_WORK_END: &str = "18:00";

/// Fixed local working hours, e.g. 09:00-18:00 at UTC+02:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    start: NaiveTime,
    end: NaiveTime,
    offset: FixedOffset,
}

impl WorkHours {
    /// Build from `HH:MM` strings and an offset from UTC in minutes.
    ///
    /// An `end` at or before `start` means the window crosses midnight.
    pub fn parse(start: &str, end: &str, utc_offset_minutes: i32) -> Result<Self, ConfigError> {
        let start = parse_hhmm("work_day.start", start)?;
        let end = parse_hhmm("work_day.end", end)?;
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "work_day.utc_offset_minutes".to_string(),
                message: format!("{utc_offset_minutes} is out of range"),
            }
        })?;
        Ok(Self { start, end, offset })
    }

    pub fn new(start: NaiveTime, end: NaiveTime, offset: FixedOffset) -> Self {
        Self { start, end, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The local calendar date `now` falls on.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// Work window for `date`, or `None` if the local times do not map to
    /// a single instant.
    pub fn window_for(&self, date: NaiveDate) -> Option<WorkDayWindow> {
        let start = self
            .offset
            .from_local_datetime(&date.and_time(self.start))
            .single()?
            .with_timezone(&Utc);

        let mut end = self
            .offset
            .from_local_datetime(&date.and_time(self.end))
            .single()?
            .with_timezone(&Utc);

        if self.end <= self.start {
            end += Duration::days(1);
        }

        TimeInterval::new(start, end)
            .ok()
            .map(|interval| WorkDayWindow::new(date, interval))
    }

    /// Consecutive windows for `days` days starting at `first`.
    pub fn horizon(&self, first: NaiveDate, days: u32) -> Vec<WorkDayWindow> {
        first
            .iter_days()
            .take(days as usize)
            .filter_map(|date| self.window_for(date))
            .collect()
    }

    /// Windows of the `days`-day horizon starting today.
    ///
    /// With `clip_to_now`, time before `now` (rounded up to the minute) is
    /// dropped and fully elapsed windows are left out.
    pub fn upcoming(&self, now: DateTime<Utc>, days: u32, clip_to_now: bool) -> Vec<WorkDayWindow> {
        let windows = self.horizon(self.local_date(now), days);
        if !clip_to_now {
            return windows;
        }
        let earliest = ceil_to_minute(now);
        windows
            .into_iter()
            .filter_map(|w| w.clipped_to(earliest))
            .collect()
    }
}

impl Default for WorkHours {
    fn default() -> Self {
        Self::parse(DEFAULT_WORK_START, DEFAULT_WORK_END, 0)
            .expect("default work hours are valid")
    }
}

fn parse_hhmm(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{value}' is not HH:MM ({e})"),
    })
}
