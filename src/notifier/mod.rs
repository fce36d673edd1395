/// Milestone notifier
///
/// A periodic job that finds habits close to a milestone boundary and alerts
/// the user once per distinct set of such habits. The set last alerted about
/// is persisted in the settings store so restarts do not repeat an alert.

pub mod sink;
pub mod state;

pub use sink::*;
pub use state::*;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{DomainError, Habit, HabitId, MilestoneDefinition, MilestoneTable};
use crate::storage::{HabitStore, SettingsStore, StorageError, KEY_NOTIFIED_MILESTONES};

/// Fraction of a milestone's minimum at which a habit counts as close to it
pub const DEFAULT_THRESHOLD: f64 = 0.98;
/// Days between notifier runs
pub const DEFAULT_INTERVAL_DAYS: u32 = 6;

/// Errors that end a notifier cycle as a failure
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Tunables of the milestone notifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotifierConfig {
    /// Fraction of `min_days` a streak must reach, in `(0, 1]`
    pub threshold: f64,
    pub interval_days: u32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            interval_days: DEFAULT_INTERVAL_DAYS,
        }
    }
}

impl NotifierConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(DomainError::Validation {
                message: format!("Notifier threshold must be in (0, 1], got {}", self.threshold),
            });
        }
        if self.interval_days == 0 {
            return Err(DomainError::Validation {
                message: "Notifier interval must be at least 1 day".to_string(),
            });
        }
        Ok(())
    }
}

/// How a notifier cycle ended; every variant is a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifierOutcome {
    /// No habit is near a milestone
    Empty,
    /// Same habits as the last alert
    Unchanged,
    /// New set recorded, but notifications are turned off
    Suppressed { count: usize },
    /// New set recorded and one notification sent
    Notified { count: usize },
}

/// Lowest day count that counts as near `milestone`
pub fn threshold_days(milestone: &MilestoneDefinition, threshold: f64) -> i64 {
    // floor(min_days * threshold), with an epsilon because 0.98 has no exact
    // binary form: 100.0 * 0.98 evaluates to 97.99999999999999
    (milestone.min_days as f64 * threshold + 1e-9).floor() as i64
}

/// Habits whose streak is within the threshold window of `milestone`
///
/// The window is `[floor(min_days * threshold), max_days)`.
pub fn near_milestone<'a>(
    milestone: &MilestoneDefinition,
    habits: &'a [Habit],
    now: DateTime<Utc>,
    threshold: f64,
) -> Vec<&'a Habit> {
    let lower = threshold_days(milestone, threshold);
    habits
        .iter()
        .filter(|h| {
            let days = h.streak_days(now);
            days >= lower && days < milestone.max_days
        })
        .collect()
}

/// Union of `near_milestone` over every milestone, keyed by habit id
///
/// A habit matched by several milestones appears once.
pub fn near_milestone_candidates<'a>(
    table: &MilestoneTable,
    habits: &'a [Habit],
    now: DateTime<Utc>,
    threshold: f64,
) -> BTreeMap<HabitId, &'a Habit> {
    table
        .milestones()
        .iter()
        .flat_map(|m| near_milestone(m, habits, now, threshold))
        .map(|h| (h.id, h))
        .collect()
}

/// The periodic near-milestone check
pub struct MilestoneNotifier {
    habits: Arc<dyn HabitStore>,
    settings: Arc<dyn SettingsStore>,
    sink: Arc<dyn NotificationSink>,
    table: Arc<MilestoneTable>,
    config: NotifierConfig,
}

impl MilestoneNotifier {
    /// Create a notifier, rejecting a malformed table or config up front
    pub fn new(
        habits: Arc<dyn HabitStore>,
        settings: Arc<dyn SettingsStore>,
        sink: Arc<dyn NotificationSink>,
        table: Arc<MilestoneTable>,
        config: NotifierConfig,
    ) -> Result<Self, DomainError> {
        table.validate()?;
        config.validate()?;

        Ok(Self {
            habits,
            settings,
            sink,
            table,
            config,
        })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Run one cycle against the current time
    pub async fn run(&self) -> Result<NotifierOutcome, NotifierError> {
        self.run_at(Utc::now()).await
    }

    /// Run one evaluation cycle as of `now`
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<NotifierOutcome, NotifierError> {
        let habits = self.habits.list_habits()?;
        let candidates = near_milestone_candidates(&self.table, &habits, now, self.config.threshold);
        debug!(habits = habits.len(), candidates = candidates.len(), "Evaluated milestone windows");

        if candidates.is_empty() {
            debug!("No habits near a milestone");
            return Ok(NotifierOutcome::Empty);
        }

        let current = NotifiedMilestoneState::new(candidates.keys().copied());
        if self.load_state()?.as_ref() == Some(&current) {
            debug!(state = %current, "Near-milestone set unchanged, skipping notification");
            return Ok(NotifierOutcome::Unchanged);
        }

        // Persist before alerting: a crash in between repeats the alert
        // instead of losing it.
        self.settings.set_string(KEY_NOTIFIED_MILESTONES, &current.encode())?;

        let count = candidates.len();
        if !self.sink.is_enabled().await? {
            info!(count, "Notifications disabled, recorded near-milestone set without alerting");
            return Ok(NotifierOutcome::Suppressed { count });
        }

        match candidates.values().next() {
            Some(habit) if count == 1 => {
                let next = self.table.next_milestone(habit.streak_days(now));
                self.sink.notify_single(habit, next).await?;
            }
            _ => self.sink.notify_count(count).await?,
        }

        info!(count, state = %current, "Sent milestone notification");
        Ok(NotifierOutcome::Notified { count })
    }

    /// Previously notified set; an unreadable value counts as none
    fn load_state(&self) -> Result<Option<NotifiedMilestoneState>, NotifierError> {
        let Some(raw) = self.settings.get_string(KEY_NOTIFIED_MILESTONES)? else {
            return Ok(None);
        };

        match NotifiedMilestoneState::decode(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable notified-milestone state");
                Ok(None)
            }
        }
    }
}
