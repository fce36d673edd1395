/// Persisted dedup state of the milestone notifier
///
/// Encoded as `v1:` followed by ascending, comma-separated decimal habit ids,
/// e.g. `v1:3,7,12`. The empty set encodes as `v1:`.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::domain::HabitId;

const FORMAT_V1: &str = "v1:";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateDecodeError {
    #[error("unsupported notified-state format: {0}")]
    UnsupportedVersion(String),

    #[error("invalid habit id '{0}' in notified state")]
    InvalidId(String),
}

/// The set of habits the user was last alerted about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifiedMilestoneState {
    habit_ids: BTreeSet<HabitId>,
}

impl NotifiedMilestoneState {
    pub fn new(habit_ids: impl IntoIterator<Item = HabitId>) -> Self {
        Self {
            habit_ids: habit_ids.into_iter().collect(),
        }
    }

    pub fn habit_ids(&self) -> &BTreeSet<HabitId> {
        &self.habit_ids
    }

    pub fn len(&self) -> usize {
        self.habit_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habit_ids.is_empty()
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(raw: &str) -> Result<Self, StateDecodeError> {
        let body = raw
            .trim()
            .strip_prefix(FORMAT_V1)
            .ok_or_else(|| StateDecodeError::UnsupportedVersion(raw.to_string()))?;

        if body.is_empty() {
            return Ok(Self::default());
        }

        let habit_ids = body
            .split(',')
            .map(|part| {
                part.parse::<HabitId>()
                    .map_err(|_| StateDecodeError::InvalidId(part.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self { habit_ids })
    }
}

impl fmt::Display for NotifiedMilestoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.habit_ids.iter().map(|id| id.to_string()).collect();
        write!(f, "{}{}", FORMAT_V1, ids.join(","))
    }
}
