/// Ordering of classified habits
///
/// Sorting by streak length recomputes each habit's day count against the
/// supplied `now`, so a resort always reflects the evaluation time.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Habit, MilestoneDefinition};

/// Field to sort habits by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Name,
    CreationDate,
    StreakLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A sort key plus direction, written as `key:dir` (e.g. `streak:desc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortKey::StreakLength, SortDirection::Descending)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self.key {
            SortKey::Name => "name",
            SortKey::CreationDate => "created",
            SortKey::StreakLength => "streak",
        };
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", key, direction)
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    /// Accepts `key` or `key:dir`; the direction defaults to ascending
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let (key_str, dir_str) = match lowered.split_once(':') {
            Some((k, d)) => (k.trim(), d.trim()),
            None => (lowered.as_str(), "asc"),
        };

        let key = match key_str {
            "name" => SortKey::Name,
            "created" | "creation" | "created_at" => SortKey::CreationDate,
            "streak" | "days" | "streak_length" => SortKey::StreakLength,
            other => {
                return Err(DomainError::Validation {
                    message: format!("Unknown sort key '{}'", other),
                })
            }
        };
        let direction = match dir_str {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => {
                return Err(DomainError::Validation {
                    message: format!("Unknown sort direction '{}'", other),
                })
            }
        };

        Ok(Self::new(key, direction))
    }
}

/// Sort (habit, milestone) pairs in place
///
/// Ties on the chosen key fall back to name ascending whatever the
/// direction; equal names keep their input order since the sort is stable.
pub fn sort_habits(
    entries: &mut [(Habit, MilestoneDefinition)],
    order: SortOrder,
    now: DateTime<Utc>,
) {
    entries.sort_by(|(a, _), (b, _)| {
        let primary = match order.key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::CreationDate => a.created_at.cmp(&b.created_at),
            SortKey::StreakLength => a.streak_days(now).cmp(&b.streak_days(now)),
        };
        let primary = match order.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        match primary {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        }
    });
}
