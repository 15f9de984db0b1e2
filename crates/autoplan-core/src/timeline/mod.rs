//! Interval math for the scheduling engine.
//!
//! This module provides:
//! - Plain interval value types (`TimeInterval`, `WorkDayWindow`)
//! - Work-day windows derived from configured local working hours
//! - Free slot detection between busy intervals

mod interval;
mod slots;
mod window;

pub use interval::{ceil_to_minute, BusyInterval, FocusBlock, TimeInterval, WorkDayWindow};
pub use slots::{FreeSlots, TimeSlotFinder, DEFAULT_MIN_SLOT_MINUTES};
pub use window::{WorkHours, DEFAULT_WORK_END, DEFAULT_WORK_START};
