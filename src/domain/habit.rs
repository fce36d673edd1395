/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something the
/// user is keeping a streak on, along with name validation and the reset
/// operation that closes a streak.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{days_since, DomainError, HabitId, HabitLog};

/// Longest habit name accepted
pub const MAX_HABIT_NAME_LEN: usize = 100;

/// A habit the user is tracking streaks for
///
/// The current streak is never stored: it is always derived from
/// `last_reset_at` and the evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier assigned by the store (0 until persisted)
    pub id: HabitId,
    /// Display name, unique across all habits
    pub name: String,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Anchor of the current streak
    pub last_reset_at: DateTime<Utc>,
    /// Whether this habit is currently active
    pub is_active: bool,
}

impl Habit {
    /// Create a new, not-yet-persisted habit
    ///
    /// The streak starts at creation time, so `last_reset_at == created_at`.
    pub fn new(name: String, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = Self::validate_name(&name)?;

        Ok(Self {
            id: HabitId(0),
            name,
            created_at: now,
            last_reset_at: now,
            is_active: true,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    pub fn from_existing(
        id: HabitId,
        name: String,
        created_at: DateTime<Utc>,
        last_reset_at: DateTime<Utc>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            last_reset_at,
            is_active,
        }
    }

    /// Length of the ongoing streak in whole days
    pub fn streak_days(&self, now: DateTime<Utc>) -> i64 {
        days_since(self.last_reset_at, now)
    }

    /// Rename the habit after validating the new name
    ///
    /// Uniqueness is a store-level concern and is checked on update.
    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = Self::validate_name(name)?;
        Ok(())
    }

    /// Close the current streak and start a new one at `now`
    ///
    /// Returns the log describing the streak that just ended. The log is not
    /// persisted yet, so its id is 0.
    pub fn reset(
        &mut self,
        now: DateTime<Utc>,
        trigger: Option<String>,
        notes: Option<String>,
    ) -> Result<HabitLog, DomainError> {
        if now < self.last_reset_at {
            return Err(DomainError::InvalidDate(format!(
                "Reset time {} is before the last reset {}",
                now.to_rfc3339(),
                self.last_reset_at.to_rfc3339()
            )));
        }

        let log = HabitLog::new(self.id, self.streak_days(now), now, trigger, notes)?;
        self.last_reset_at = now;
        Ok(log)
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_HABIT_NAME_LEN {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name cannot be longer than {} characters",
                MAX_HABIT_NAME_LEN
            )));
        }

        Ok(trimmed.to_string())
    }
}
