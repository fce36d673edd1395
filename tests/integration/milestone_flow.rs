/// End-to-end milestone flow over a file-backed database
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;

use habit_milestones::notifier::near_milestone_candidates;
use habit_milestones::storage::{KEY_NOTIFICATIONS_ENABLED, KEY_NOTIFIED_MILESTONES};
use habit_milestones::tools::*;
use habit_milestones::*;

/// Sink that remembers what it was asked to show
#[derive(Default)]
struct RecordingSink {
    enabled: bool,
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn is_enabled(&self) -> Result<bool, StorageError> {
        Ok(self.enabled)
    }

    async fn notify_single(&self, habit: &Habit, _next: Option<&MilestoneDefinition>) -> Result<(), StorageError> {
        self.sent.lock().unwrap().push(format!("single:{}", habit.name));
        Ok(())
    }

    async fn notify_count(&self, count: usize) -> Result<(), StorageError> {
        self.sent.lock().unwrap().push(format!("count:{}", count));
        Ok(())
    }
}

struct Fixture {
    _file: NamedTempFile,
    app: HabitMilestonesApp,
    now: DateTime<Utc>,
    a: HabitId,
    b: HabitId,
}

/// Habit A running for 45 days; habit B with one closed 90-day streak that
/// ended 30 days ago
fn fixture() -> Fixture {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let app = HabitMilestonesApp::new(file.path().to_path_buf()).expect("Failed to create app");
    let now = Utc::now();

    let a = create_habit(app.storage(), CreateHabitParams { name: "A".into() }, now - Duration::days(45))
        .unwrap()
        .habit_id;
    let b = create_habit(app.storage(), CreateHabitParams { name: "B".into() }, now - Duration::days(120))
        .unwrap()
        .habit_id;
    let params = ResetHabitParams { habit_id: b, trigger: Some("Holiday".into()), notes: None };
    reset_habit(app.storage(), app.analytics(), params, now - Duration::days(30)).unwrap();

    Fixture { _file: file, app, now, a, b }
}

#[test]
fn test_ongoing_habit_is_classified() {
    let f = fixture();
    let habit = f.app.storage().get_habit(f.a).unwrap().unwrap();

    let days = habit.streak_days(f.now);
    assert_eq!(days, 45);
    assert_eq!(f.app.analytics().classify(days).unwrap().title, "One Month");
}

#[test]
fn test_closed_streak_is_all_time_best() {
    let f = fixture();

    let response = all_time_best(f.app.storage(), f.app.analytics(), f.now).unwrap();
    let best = response.best.unwrap();

    assert_eq!(best.habit_id, f.b);
    assert_eq!(best.days, 90);
    assert_eq!(best.milestone.title, "Three Months");
    assert_eq!(best.end, Some(f.now - Duration::days(30)));
    assert_eq!(best.start, f.now - Duration::days(120));
}

#[tokio::test]
async fn test_notifier_alerts_once_per_set() {
    let f = fixture();
    let sink = Arc::new(RecordingSink { enabled: true, ..Default::default() });
    let notifier = f.app.notifier_with_sink(NotifierConfig::default(), sink.clone()).unwrap();

    // A at 45 days sits in the One Month window [29, 59)
    let habits = f.app.storage().list_habits().unwrap();
    let table = MilestoneTable::standard();
    let candidates = near_milestone_candidates(&table, &habits, f.now, 0.98);
    assert!(candidates.contains_key(&f.a));

    // B's membership follows its ongoing 30-day streak, not its closed one
    let b_days = f.app.storage().get_habit(f.b).unwrap().unwrap().streak_days(f.now);
    let b_expected = table
        .milestones()
        .iter()
        .any(|m| b_days >= (m.min_days as f64 * 0.98 + 1e-9).floor() as i64 && b_days < m.max_days);
    assert_eq!(candidates.contains_key(&f.b), b_expected);

    let first = tokio_test::assert_ok!(notifier.run_at(f.now).await);
    assert_eq!(first, NotifierOutcome::Notified { count: candidates.len() });

    let second = tokio_test::assert_ok!(notifier.run_at(f.now).await);
    assert_eq!(second, NotifierOutcome::Unchanged);
    assert_eq!(sink.sent.lock().unwrap().len(), 1);

    let state = f.app.storage().get_string(KEY_NOTIFIED_MILESTONES).unwrap().unwrap();
    assert!(state.starts_with("v1:"));
    assert!(state.contains(&f.a.to_string()));
}

#[tokio::test]
async fn test_disabled_notifications_still_record_state() {
    let f = fixture();
    f.app.storage().set_bool(KEY_NOTIFICATIONS_ENABLED, false).unwrap();

    let outcome = f.app.notifier(NotifierConfig::default()).unwrap().run_at(f.now).await.unwrap();

    assert!(matches!(outcome, NotifierOutcome::Suppressed { .. }));
    assert!(f.app.storage().get_string(KEY_NOTIFIED_MILESTONES).unwrap().is_some());
}

#[tokio::test]
async fn test_live_all_time_follows_store() {
    let f = fixture();
    let live = f.app.live_all_time().unwrap();
    assert_eq!(live.current().unwrap().habit_id, f.b);

    let mut updates = live.subscribe();
    create_habit(f.app.storage(), CreateHabitParams { name: "C".into() }, f.now - Duration::days(200)).unwrap();

    tokio::time::timeout(StdDuration::from_secs(5), updates.changed())
        .await
        .expect("no recompute after insert")
        .unwrap();
    let best = updates.borrow_and_update().clone().unwrap();
    assert_eq!(best.days, 200);
    assert!(best.is_ongoing());

    live.stop();
}
