/// Tool for deleting habits

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::HabitId;
use crate::storage::{HabitStore, LogStore};
use crate::tools::ToolError;

/// Parameters for deleting a habit
#[derive(Debug, Deserialize)]
pub struct DeleteHabitParams {
    pub habit_id: HabitId,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    /// Logs removed together with the habit
    pub deleted_logs: usize,
    pub message: String,
}

/// Permanently delete a habit and its logs
pub fn delete_habit<S: HabitStore + LogStore + ?Sized>(
    storage: &S,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit = storage
        .get_habit(params.habit_id)?
        .ok_or_else(|| ToolError::habit_not_found(params.habit_id))?;
    let deleted_logs = storage.logs_for_habit(habit.id)?.len();

    storage.delete_habit(habit.id)?;
    info!(habit_id = %habit.id, deleted_logs, "Deleted habit");

    Ok(DeleteHabitResponse {
        success: true,
        deleted_logs,
        message: format!("🗑️ Deleted habit '{}' and {} log(s)", habit.name, deleted_logs),
    })
}
