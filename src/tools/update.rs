/// Tools for updating existing habits and logs
///
/// Renaming and pausing act on the habit row; editing a log may only touch
/// its trigger and notes; the streak it records is fixed once closed.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{HabitId, HabitLog, LogId};
use crate::storage::{HabitStore, LogStore};
use crate::tools::ToolError;

/// Parameters for renaming a habit
#[derive(Debug, Deserialize)]
pub struct RenameHabitParams {
    pub habit_id: HabitId,
    pub name: String,
}

/// Parameters for pausing or resuming a habit
#[derive(Debug, Deserialize)]
pub struct SetHabitActiveParams {
    pub habit_id: HabitId,
    pub is_active: bool,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Parameters for editing a closed streak's log
#[derive(Debug, Deserialize)]
pub struct EditLogParams {
    pub log_id: LogId,
    pub trigger: Option<String>,
    pub notes: Option<String>,
}

/// Response from editing a log
#[derive(Debug, Serialize)]
pub struct EditLogResponse {
    pub success: bool,
    pub log: HabitLog,
    pub message: String,
}

/// Rename a habit; the store rejects names already in use
pub fn rename_habit<S: HabitStore + ?Sized>(
    storage: &S,
    params: RenameHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let mut habit = storage
        .get_habit(params.habit_id)?
        .ok_or_else(|| ToolError::habit_not_found(params.habit_id))?;

    let old_name = habit.name.clone();
    habit.rename(&params.name)?;
    storage.update_habit(&habit)?;

    info!(habit_id = %habit.id, from = %old_name, to = %habit.name, "Renamed habit");

    Ok(UpdateHabitResponse {
        success: true,
        message: format!("✅ Renamed '{}' to '{}'", old_name, habit.name),
    })
}

/// Pause or resume a habit
///
/// Paused habits keep their reset anchor but no longer compete for the
/// all-time best ongoing streak.
pub fn set_habit_active<S: HabitStore + ?Sized>(
    storage: &S,
    params: SetHabitActiveParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let mut habit = storage
        .get_habit(params.habit_id)?
        .ok_or_else(|| ToolError::habit_not_found(params.habit_id))?;

    habit.is_active = params.is_active;
    storage.update_habit(&habit)?;

    let message = if params.is_active {
        format!("▶️ Resumed habit '{}'", habit.name)
    } else {
        format!("⏸️ Paused habit '{}'", habit.name)
    };

    Ok(UpdateHabitResponse { success: true, message })
}

/// Replace the trigger and notes of a log
pub fn edit_log<S: LogStore + ?Sized>(
    storage: &S,
    params: EditLogParams,
) -> Result<EditLogResponse, ToolError> {
    let mut log = storage
        .get_log(params.log_id)?
        .ok_or_else(|| ToolError::log_not_found(params.log_id))?;

    log.edit(params.trigger, params.notes)?;
    storage.update_log(&log)?;

    info!(log_id = %log.id, habit_id = %log.habit_id, "Edited log");

    Ok(EditLogResponse {
        success: true,
        message: format!("📝 Updated log of a {}-day streak", log.streak_duration),
        log,
    })
}
