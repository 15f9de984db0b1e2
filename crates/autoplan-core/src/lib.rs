//! # Autoplan Core Library
//!
//! This library provides the automatic scheduling engine: given a user's
//! existing commitments and a backlog of pending tasks, it computes free
//! time, greedily places tasks into it, and identifies and protects long
//! uninterrupted focus blocks.
//!
//! ## Architecture
//!
//! - **Timeline**: Interval value types, work-day windows and free slot detection
//! - **Scheduler**: Greedy first-fit placement of pending tasks
//! - **Focus**: Detection of focus blocks and their protection as commitments
//! - **Storage**: Collaborator traits, SQLite and in-memory stores, TOML configuration
//!
//! ## Key Components
//!
//! - [`TimeSlotFinder`]: Free slots of one work window
//! - [`TaskScheduler`]: Places tasks into free slots across the horizon
//! - [`FocusBlockDetector`]: Free slots long enough for deep work
//! - [`FocusTimeProtector`]: Reserves focus time on the calendar
//! - [`Planner`]: Facade exposing the caller operations

pub mod commitment;
pub mod error;
pub mod focus;
pub mod planner;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod timeline;

pub use commitment::{Commitment, CommitmentTag, NewCommitment};
pub use error::{ConfigError, CoreError, DataAccessError, Result, ValidationError};
pub use focus::{FocusBlockDetector, FocusConfig, FocusTimeProtector};
pub use planner::Planner;
pub use scheduler::{ScheduleReport, SchedulerConfig, TaskScheduler};
pub use storage::{
    BusyIntervalSource, CommitmentStore, Config, MemoryStore, PlannerDb, TaskSource,
};
pub use task::{Task, TaskStatus};
pub use timeline::{
    BusyInterval, FocusBlock, TimeInterval, TimeSlotFinder, WorkDayWindow, WorkHours,
};
