/// Tool for the best streak across all habits, past and present

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::AnalyticsEngine;
use crate::domain::AllTimeStreakResult;
use crate::storage::{HabitStore, LogStore};
use crate::tools::ToolError;

/// Response with the all-time best streak
#[derive(Debug, Serialize)]
pub struct AllTimeBestResponse {
    /// `None` until some streak has lasted at least a day
    pub best: Option<AllTimeStreakResult>,
    pub habit_name: Option<String>,
    pub message: String,
}

/// Compare the longest ongoing streak with the longest closed one
pub fn all_time_best<S: HabitStore + LogStore + ?Sized>(
    storage: &S,
    engine: &AnalyticsEngine,
    now: DateTime<Utc>,
) -> Result<AllTimeBestResponse, ToolError> {
    let habits = storage.list_habits()?;
    let logs = storage.list_logs()?;
    let best = engine.all_time_best(&habits, &logs, now)?;

    let habit_name = best
        .as_ref()
        .and_then(|b| habits.iter().find(|h| h.id == b.habit_id))
        .map(|h| h.name.clone());

    let message = match (&best, &habit_name) {
        (Some(b), Some(name)) if b.is_ongoing() => format!(
            "🏅 Best streak ever: {} days of '{}' and still going! {} {}",
            b.days, name, b.milestone.badge, b.milestone.title
        ),
        (Some(b), Some(name)) => format!(
            "🏅 Best streak ever: {} days of '{}'. {} {}",
            b.days, name, b.milestone.badge, b.milestone.title
        ),
        _ => "No streaks yet. Keep going!".to_string(),
    };

    Ok(AllTimeBestResponse { best, habit_name, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Habit;
    use crate::storage::SqliteStorage;
    use chrono::Duration;

    #[test]
    fn test_closed_streak_beats_shorter_ongoing() {
        let storage = SqliteStorage::in_memory().unwrap();
        let now = Utc::now();

        let mut old = storage
            .insert_habit(&Habit::new("Fast Food".into(), now - Duration::days(200)).unwrap())
            .unwrap();
        let log = old.reset(now - Duration::days(20), None, None).unwrap();
        storage.record_reset(&old, &log).unwrap();

        storage
            .insert_habit(&Habit::new("Social Media".into(), now - Duration::days(30)).unwrap())
            .unwrap();

        let response = all_time_best(&storage, &AnalyticsEngine::new(), now).unwrap();
        let best = response.best.unwrap();

        assert_eq!(best.days, 180);
        assert!(!best.is_ongoing());
        assert_eq!(response.habit_name.as_deref(), Some("Fast Food"));
        assert_eq!(best.milestone.title, "Six Months");
    }

    #[test]
    fn test_no_streaks_yet() {
        let storage = SqliteStorage::in_memory().unwrap();
        let now = Utc::now();
        storage.insert_habit(&Habit::new("Brand New".into(), now).unwrap()).unwrap();

        let response = all_time_best(&storage, &AnalyticsEngine::new(), now).unwrap();
        assert!(response.best.is_none());
        assert!(response.habit_name.is_none());
    }
}
