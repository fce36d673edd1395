/// Tool for resetting a habit, which closes its current streak

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::AnalyticsEngine;
use crate::domain::{HabitId, HabitLog, MilestoneDefinition};
use crate::storage::{HabitStore, LogStore};
use crate::tools::ToolError;

/// Parameters for resetting a habit
#[derive(Debug, Deserialize)]
pub struct ResetHabitParams {
    pub habit_id: HabitId,
    /// What caused the reset
    pub trigger: Option<String>,
    pub notes: Option<String>,
}

/// Response from resetting a habit
#[derive(Debug, Serialize)]
pub struct ResetHabitResponse {
    pub success: bool,
    /// The streak that was just closed
    pub log: HabitLog,
    /// Tier the closed streak reached
    pub milestone: MilestoneDefinition,
    pub message: String,
}

/// Close the habit's ongoing streak at `now` and start a new one
///
/// The closed streak is logged and the habit's reset anchor moves to `now`
/// in one store transaction.
pub fn reset_habit<S: HabitStore + LogStore + ?Sized>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: ResetHabitParams,
    now: DateTime<Utc>,
) -> Result<ResetHabitResponse, ToolError> {
    let mut habit = storage
        .get_habit(params.habit_id)?
        .ok_or_else(|| ToolError::habit_not_found(params.habit_id))?;

    let log = habit.reset(now, params.trigger, params.notes)?;
    let milestone = engine.classify(log.streak_duration)?.clone();
    let log = storage.record_reset(&habit, &log)?;

    info!(
        habit_id = %habit.id,
        days = log.streak_duration,
        milestone = %milestone.title,
        "Reset habit"
    );

    Ok(ResetHabitResponse {
        success: true,
        message: format!(
            "🔄 Reset '{}' after {} days ({} {}). A new streak starts now.",
            habit.name, log.streak_duration, milestone.badge, milestone.title
        ),
        log,
        milestone,
    })
}
