/// Tool for listing habits with their live streaks
///
/// Every entry carries the derived streak length, its milestone, the next
/// milestone ahead and the display intensity with its gradient colors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analytics::{AnalyticsEngine, ColorStops, SortOrder};
use crate::domain::{HabitId, MilestoneDefinition};
use crate::storage::{HabitStore, SettingsStore, KEY_SORT_ORDER};
use crate::tools::ToolError;

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize)]
pub struct ListHabitsParams {
    /// Falls back to the persisted default order when omitted
    pub sort: Option<SortOrder>,
    pub active_only: Option<bool>,
}

/// Information about a habit in the list
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub habit_id: HabitId,
    pub name: String,
    pub streak_days: i64,
    pub milestone: MilestoneDefinition,
    pub next_milestone: Option<MilestoneDefinition>,
    pub intensity: f32,
    pub colors: ColorStops,
    pub created_at: DateTime<Utc>,
    pub last_reset_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Summary statistics for all habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: usize,
    pub active_habits: usize,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub sort: SortOrder,
    pub habits: Vec<HabitSummary>,
    pub summary: HabitListSummary,
}

/// The habit list order saved in settings
///
/// An unreadable saved value is ignored in favour of the built-in default.
pub fn default_sort_order<S: SettingsStore + ?Sized>(storage: &S) -> Result<SortOrder, ToolError> {
    let Some(raw) = storage.get_string(KEY_SORT_ORDER)? else {
        return Ok(SortOrder::default());
    };

    match raw.parse() {
        Ok(order) => Ok(order),
        Err(e) => {
            warn!(value = %raw, error = %e, "Ignoring unreadable saved sort order");
            Ok(SortOrder::default())
        }
    }
}

/// Save the order used when a listing does not ask for one
pub fn set_default_sort_order<S: SettingsStore + ?Sized>(
    storage: &S,
    order: SortOrder,
) -> Result<(), ToolError> {
    storage.set_string(KEY_SORT_ORDER, &order.to_string())?;
    debug!(%order, "Saved default sort order");
    Ok(())
}

/// List habits as of `now`
pub fn list_habits<S: HabitStore + SettingsStore + ?Sized>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: ListHabitsParams,
    now: DateTime<Utc>,
) -> Result<ListHabitsResponse, ToolError> {
    let sort = match params.sort {
        Some(order) => order,
        None => default_sort_order(storage)?,
    };

    let all = storage.list_habits()?;
    let summary = HabitListSummary {
        total_habits: all.len(),
        active_habits: all.iter().filter(|h| h.is_active).count(),
    };

    let active_only = params.active_only.unwrap_or(false);
    let habits = all.into_iter().filter(|h| h.is_active || !active_only).collect();

    let habits = engine
        .sorted_habits(habits, sort, now)?
        .into_iter()
        .map(|(habit, milestone)| {
            let streak_days = habit.streak_days(now);
            HabitSummary {
                habit_id: habit.id,
                name: habit.name,
                streak_days,
                milestone,
                next_milestone: engine.table().next_milestone(streak_days).cloned(),
                intensity: engine.intensity(streak_days),
                colors: engine.color_stops_for_days(streak_days),
                created_at: habit.created_at,
                last_reset_at: habit.last_reset_at,
                is_active: habit.is_active,
            }
        })
        .collect();

    Ok(ListHabitsResponse { sort, habits, summary })
}
