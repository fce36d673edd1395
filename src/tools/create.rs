/// Tool for creating new habits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Habit, HabitId};
use crate::storage::HabitStore;
use crate::tools::ToolError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: HabitId,
    pub habit: Habit,
    pub message: String,
}

/// Create a new habit whose streak starts at `now`
pub fn create_habit<S: HabitStore + ?Sized>(
    storage: &S,
    params: CreateHabitParams,
    now: DateTime<Utc>,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(params.name, now)?;
    let habit = storage.insert_habit(&habit)?;

    info!(habit_id = %habit.id, name = %habit.name, "Created habit");

    Ok(CreateHabitResponse {
        success: true,
        habit_id: habit.id,
        message: format!("✅ Created habit '{}'! Your streak starts now.", habit.name),
        habit,
    })
}
