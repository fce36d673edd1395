/// Tool for looking at one habit's past streaks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{Habit, HabitId, HabitLog, MilestoneDefinition};
use crate::storage::{HabitStore, LogStore};
use crate::tools::ToolError;

/// Parameters for a habit's history
#[derive(Debug, Deserialize)]
pub struct HabitHistoryParams {
    pub habit_id: HabitId,
}

/// A closed streak with its derived start and tier
#[derive(Debug, Serialize)]
pub struct LogSummary {
    #[serde(flatten)]
    pub log: HabitLog,
    pub started_at: DateTime<Utc>,
    pub milestone: MilestoneDefinition,
}

/// Response with the ongoing streak and every closed one
#[derive(Debug, Serialize)]
pub struct HabitHistoryResponse {
    pub habit: Habit,
    pub current_streak_days: i64,
    pub current_milestone: MilestoneDefinition,
    /// Newest first
    pub logs: Vec<LogSummary>,
    pub longest: Option<LogSummary>,
    pub message: String,
}

pub fn habit_history<S: HabitStore + LogStore + ?Sized>(
    storage: &S,
    engine: &AnalyticsEngine,
    params: HabitHistoryParams,
    now: DateTime<Utc>,
) -> Result<HabitHistoryResponse, ToolError> {
    let habit = storage
        .get_habit(params.habit_id)?
        .ok_or_else(|| ToolError::habit_not_found(params.habit_id))?;

    let summarize = |log: HabitLog| -> Result<LogSummary, ToolError> {
        let milestone = engine.classify(log.streak_duration)?.clone();
        Ok(LogSummary {
            started_at: log.started_at(),
            milestone,
            log,
        })
    };

    let logs = storage
        .logs_for_habit(habit.id)?
        .into_iter()
        .map(summarize)
        .collect::<Result<Vec<_>, _>>()?;
    let longest = storage.longest_for_habit(habit.id)?.map(summarize).transpose()?;

    let current_streak_days = habit.streak_days(now);
    let current_milestone = engine.classify(current_streak_days)?.clone();

    let message = match &longest {
        Some(best) => format!(
            "📈 '{}' is on day {} ({}). {} past streak(s), longest {} days.",
            habit.name,
            current_streak_days,
            current_milestone.title,
            logs.len(),
            best.log.streak_duration
        ),
        None => format!(
            "📈 '{}' is on day {} ({}). No resets yet!",
            habit.name, current_streak_days, current_milestone.title
        ),
    };

    Ok(HabitHistoryResponse {
        habit,
        current_streak_days,
        current_milestone,
        logs,
        longest,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use chrono::Duration;

    #[test]
    fn test_history_newest_first_with_longest() {
        let storage = SqliteStorage::in_memory().unwrap();
        let engine = AnalyticsEngine::new();
        let start = Utc::now() - Duration::days(100);
        let mut habit = storage.insert_habit(&Habit::new("Chips".into(), start).unwrap()).unwrap();

        // Streaks of 20, 50 and 10 days, then an ongoing one of 20
        let mut at = start;
        for days in [20, 50, 10] {
            at = at + Duration::days(days);
            let log = habit.reset(at, None, None).unwrap();
            storage.record_reset(&habit, &log).unwrap();
        }
        let now = at + Duration::days(20);

        let response = habit_history(&storage, &engine, HabitHistoryParams { habit_id: habit.id }, now).unwrap();

        let durations: Vec<i64> = response.logs.iter().map(|l| l.log.streak_duration).collect();
        assert_eq!(durations, vec![10, 50, 20]);
        let longest = response.longest.unwrap();
        assert_eq!(longest.log.streak_duration, 50);
        assert_eq!(longest.milestone.title, "One Month");
        assert_eq!(response.current_streak_days, 20);
        assert_eq!(response.current_milestone.title, "Two Weeks");
    }

    #[test]
    fn test_history_without_resets() {
        let storage = SqliteStorage::in_memory().unwrap();
        let now = Utc::now();
        let habit = storage.insert_habit(&Habit::new("Tea".into(), now).unwrap()).unwrap();

        let response = habit_history(&storage, &AnalyticsEngine::new(), HabitHistoryParams { habit_id: habit.id }, now).unwrap();
        assert!(response.logs.is_empty());
        assert!(response.longest.is_none());
        assert!(response.message.contains("No resets yet"));
    }
}
