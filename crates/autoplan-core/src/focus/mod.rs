//! Focus time: detection of long free blocks and their protection.
//!
//! The detector is a read-only pass over a 7-day horizon. The protector
//! turns each detected block into a fixed-length focus-time commitment.

mod detector;
mod protector;

pub use detector::FocusBlockDetector;
pub use protector::FocusTimeProtector;

use crate::scheduler::DEFAULT_HORIZON_DAYS;
use crate::timeline::DEFAULT_MIN_SLOT_MINUTES;

/// Minimum length of a focus block, and the length protected for each one.
pub const FOCUS_BLOCK_MINUTES: i64 = 120;

/// Title given to protected focus commitments.
pub const FOCUS_TIME_TITLE: &str = "Focus Time";

/// Focus detection and protection configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusConfig {
    /// Minimum free slot considered at all (minutes)
    pub min_slot_minutes: i64,
    /// Minimum free slot that counts as a focus block (minutes)
    pub min_block_minutes: i64,
    /// Length of each protected commitment (minutes)
    pub protect_minutes: i64,
    /// Days searched, starting at the week start
    pub horizon_days: u32,
    /// When protecting, ignore time before the current instant
    pub clip_to_now: bool,
    /// Skip blocks whose start already carries a focus-time commitment
    pub dedupe: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            min_slot_minutes: DEFAULT_MIN_SLOT_MINUTES,
            min_block_minutes: FOCUS_BLOCK_MINUTES,
            protect_minutes: FOCUS_BLOCK_MINUTES,
            horizon_days: DEFAULT_HORIZON_DAYS,
            clip_to_now: true,
            dedupe: false,
        }
    }
}
