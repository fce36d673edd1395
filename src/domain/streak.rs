/// Streak arithmetic and derived streak results
///
/// Streak lengths are never stored for live habits; they are computed from a
/// reference timestamp and the evaluation time every time they are needed.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{HabitId, MilestoneDefinition};

/// Milliseconds in one day
pub const ONE_DAY_MILLIS: i64 = 86_400_000;

/// Whole days elapsed between `reference` and `now`
///
/// Rounds toward negative infinity, so a reference in the future yields a
/// negative count rather than being clamped to zero.
pub fn days_since(reference: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - reference).num_milliseconds().div_euclid(ONE_DAY_MILLIS)
}

/// The best streak across live habits and closed logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTimeStreakResult {
    /// Habit the streak belongs to
    pub habit_id: HabitId,
    /// Streak length in days
    pub days: i64,
    /// Tier the streak length falls into
    pub milestone: MilestoneDefinition,
    /// When the streak started
    pub start: DateTime<Utc>,
    /// When the streak ended, `None` while it is still ongoing
    pub end: Option<DateTime<Utc>>,
}

impl AllTimeStreakResult {
    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }
}
