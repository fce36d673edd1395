/// Basic unit tests to verify core functionality through the public API
use habit_milestones::*;
use habit_milestones::notifier::{near_milestone, NotifiedMilestoneState};
use chrono::{Duration, TimeZone, Utc};
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn at(days_ago: i64) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() - Duration::days(days_ago)
    }

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new("Test Habit".to_string(), at(0));

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
        assert_eq!(habit.id, HabitId(0));
        assert!(habit.is_active);
    }

    #[test]
    fn test_every_day_count_has_a_milestone() {
        let table = MilestoneTable::standard();
        for days in 0..=10_000 {
            let milestone = table.classify(days).unwrap();
            assert!(milestone.min_days <= days && days <= milestone.max_days);
        }
        assert!(table.classify(-1).is_err());
    }

    #[test]
    fn test_completed_wins_ties_ongoing_needs_more() {
        let now = at(0);
        let engine = AnalyticsEngine::new();
        let habit = Habit::from_existing(HabitId(1), "Sugar".into(), at(100), at(40), true);
        let log = HabitLog::from_existing(LogId(1), HabitId(2), 40, at(50), None, None);

        let tie = engine.all_time_best(&[habit.clone()], &[log.clone()], now).unwrap().unwrap();
        assert_eq!(tie.habit_id, HabitId(2));
        assert_eq!(tie.end, Some(at(50)));

        let longer = Habit { last_reset_at: at(41), ..habit };
        let best = engine.all_time_best(&[longer], &[log], now).unwrap().unwrap();
        assert_eq!(best.habit_id, HabitId(1));
        assert_eq!(best.days, 41);
        assert!(best.is_ongoing());
    }

    #[test]
    fn test_no_streak_data() {
        let engine = AnalyticsEngine::new();
        assert!(engine.all_time_best(&[], &[], at(0)).unwrap().is_none());

        let fresh = Habit::from_existing(HabitId(1), "Fresh".into(), at(0), at(0), true);
        assert!(engine.all_time_best(&[fresh], &[], at(0)).unwrap().is_none());
    }

    #[test]
    fn test_threshold_boundary() {
        let hundred = MilestoneDefinition::new("Hundred", 100, 200, "💯", "Triple digits");
        let habits = vec![
            Habit::from_existing(HabitId(1), "97".into(), at(300), at(97), true),
            Habit::from_existing(HabitId(2), "98".into(), at(300), at(98), true),
        ];

        let near = near_milestone(&hundred, &habits, at(0), 0.98);
        let ids: Vec<HabitId> = near.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![HabitId(2)]);
    }

    #[test]
    fn test_sort_order_parsing() {
        let order: SortOrder = "name:asc".parse().unwrap();
        assert_eq!(order, SortOrder::new(SortKey::Name, SortDirection::Ascending));
        assert_eq!(SortOrder::default().to_string().parse::<SortOrder>().unwrap(), SortOrder::default());
        assert!("colour".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_notified_state_format() {
        let state = NotifiedMilestoneState::new([HabitId(12), HabitId(3), HabitId(7)]);
        assert_eq!(state.encode(), "v1:3,7,12");
        assert_eq!(NotifiedMilestoneState::decode("v1:12,7,3").unwrap(), state);
    }

    #[test]
    fn test_app_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let app = HabitMilestonesApp::new(temp_file.path().to_path_buf());
        assert!(app.is_ok());
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());
        assert!(storage.unwrap().list_habits().unwrap().is_empty());
    }
}
