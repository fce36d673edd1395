/// Basic integration tests
use habit_milestones::*;
use habit_milestones::tools::*;
use chrono::{Duration, Utc};
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[test]
    fn test_app_basic_workflow() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let app = HabitMilestonesApp::new(temp_file.path().to_path_buf())
            .expect("Failed to create app");
        let now = Utc::now();

        let created = tokio_test::assert_ok!(create_habit(
            app.storage(),
            CreateHabitParams { name: "Late Snacks".into() },
            now - Duration::days(8),
        ));

        let listed = tokio_test::assert_ok!(list_habits(
            app.storage(),
            app.analytics(),
            ListHabitsParams::default(),
            now,
        ));
        assert_eq!(listed.habits.len(), 1);
        assert_eq!(listed.habits[0].streak_days, 8);
        assert_eq!(listed.habits[0].milestone.title, "One Week");

        let reset = tokio_test::assert_ok!(reset_habit(
            app.storage(),
            app.analytics(),
            ResetHabitParams {
                habit_id: created.habit_id,
                trigger: Some("Movie night".into()),
                notes: None,
            },
            now,
        ));
        assert_eq!(reset.log.streak_duration, 8);

        let history = tokio_test::assert_ok!(habit_history(
            app.storage(),
            app.analytics(),
            HabitHistoryParams { habit_id: created.habit_id },
            now,
        ));
        assert_eq!(history.logs.len(), 1);
        assert_eq!(history.current_streak_days, 0);
    }

    #[test]
    fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();
        let now = Utc::now();

        {
            let app = HabitMilestonesApp::new(db_path.clone()).expect("Failed to create first app");
            create_habit(app.storage(), CreateHabitParams { name: "Doomscrolling".into() }, now).unwrap();
            app.storage().set_string(storage::KEY_SORT_ORDER, "name:asc").unwrap();
        }

        // Reopening the same file sees the data and skips migrations
        let app = HabitMilestonesApp::new(db_path).expect("Failed to create second app");
        let habits = app.storage().list_habits().unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].name, "Doomscrolling");
        assert_eq!(default_sort_order(app.storage()).unwrap().to_string(), "name:asc");
    }

    #[test]
    fn test_storage_interface() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf())
            .expect("Failed to create storage");

        // One value serves all three store interfaces
        let _: &dyn HabitStore = &storage;
        let _: &dyn LogStore = &storage;
        let _: &dyn SettingsStore = &storage;
    }
}
