/// HabitLog entity for closed streaks
///
/// Every reset freezes the streak that just ended into a HabitLog. Logs are
/// immutable apart from the free-text trigger and notes.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use crate::domain::{DomainError, HabitId, LogId};

/// Longest trigger or notes text accepted
pub const MAX_LOG_TEXT_LEN: usize = 500;

/// A record of a streak that ended on reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitLog {
    /// Unique identifier assigned by the store (0 until persisted)
    pub id: LogId,
    /// Which habit this log belongs to
    pub habit_id: HabitId,
    /// Length of the closed streak in days, captured at reset time
    pub streak_duration: i64,
    /// When the reset happened (the end of the closed streak)
    pub created_at: DateTime<Utc>,
    /// What caused the reset
    pub trigger: Option<String>,
    /// User's notes about the reset
    pub notes: Option<String>,
}

impl HabitLog {
    /// Create a new, not-yet-persisted log with validation
    pub fn new(
        habit_id: HabitId,
        streak_duration: i64,
        created_at: DateTime<Utc>,
        trigger: Option<String>,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        if streak_duration < 0 {
            return Err(DomainError::Validation {
                message: format!("Streak duration cannot be negative, got {}", streak_duration),
            });
        }
        let trigger = Self::validate_text("Trigger", trigger)?;
        let notes = Self::validate_text("Notes", notes)?;

        Ok(Self {
            id: LogId(0),
            habit_id,
            streak_duration,
            created_at,
            trigger,
            notes,
        })
    }

    /// Create a log from existing data (used when loading from database)
    pub fn from_existing(
        id: LogId,
        habit_id: HabitId,
        streak_duration: i64,
        created_at: DateTime<Utc>,
        trigger: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            habit_id,
            streak_duration,
            created_at,
            trigger,
            notes,
        }
    }

    /// When the closed streak began
    ///
    /// Durations too large to represent clamp to the earliest instant.
    pub fn started_at(&self) -> DateTime<Utc> {
        Duration::try_days(self.streak_duration)
            .and_then(|d| self.created_at.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Replace trigger and notes, the only mutable fields of a log
    pub fn edit(
        &mut self,
        trigger: Option<String>,
        notes: Option<String>,
    ) -> Result<(), DomainError> {
        let trigger = Self::validate_text("Trigger", trigger)?;
        let notes = Self::validate_text("Notes", notes)?;
        self.trigger = trigger;
        self.notes = notes;
        Ok(())
    }

    /// Blank text is stored as absent
    fn validate_text(field: &str, text: Option<String>) -> Result<Option<String>, DomainError> {
        match text {
            Some(t) if t.trim().is_empty() => Ok(None),
            Some(t) if t.chars().count() > MAX_LOG_TEXT_LEN => Err(DomainError::Validation {
                message: format!("{} cannot be longer than {} characters", field, MAX_LOG_TEXT_LEN),
            }),
            other => Ok(other),
        }
    }
}
