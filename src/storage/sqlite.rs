/// SQLite implementation of the storage interfaces
///
/// This module provides the concrete SQLite implementation for storing
/// habits, closed-streak logs and settings. It handles all SQL queries and
/// data conversion, and republishes snapshots after every mutation.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::watch;

use crate::domain::{Habit, HabitId, HabitLog, LogId};
use crate::storage::{migrations, HabitStore, LogStore, SettingsStore, StorageError};

const HABIT_COLUMNS: &str = "id, name, created_at, last_reset_at, is_active";
const LOG_COLUMNS: &str = "id, habit_id, streak_duration, created_at, reset_trigger, notes";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so one storage instance can be shared
/// between the CLI, the live subscriptions and the background notifier.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    habits_tx: watch::Sender<Vec<Habit>>,
    logs_tx: watch::Sender<Vec<HabitLog>>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Storage backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Cascading log deletion relies on this
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        let habits = query_habits(&conn)?;
        let logs = query_logs(&conn)?;
        let (habits_tx, _) = watch::channel(habits);
        let (logs_tx, _) = watch::channel(logs);

        Ok(Self {
            conn: Mutex::new(conn),
            habits_tx,
            logs_tx,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish_habits(&self, conn: &Connection) -> Result<(), StorageError> {
        self.habits_tx.send_replace(query_habits(conn)?);
        Ok(())
    }

    fn publish_logs(&self, conn: &Connection) -> Result<(), StorageError> {
        self.logs_tx.send_replace(query_logs(conn)?);
        Ok(())
    }
}

impl HabitStore for SqliteStorage {
    fn insert_habit(&self, habit: &Habit) -> Result<Habit, StorageError> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO habits (name, created_at, last_reset_at, is_active)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                habit.name,
                format_timestamp(&habit.created_at),
                format_timestamp(&habit.last_reset_at),
                habit.is_active
            ],
        )
        .map_err(|e| map_name_conflict(e, &habit.name))?;

        let mut saved = habit.clone();
        saved.id = HabitId(conn.last_insert_rowid());
        self.publish_habits(&conn)?;

        tracing::debug!("Created habit: {} ({})", saved.name, saved.id);
        Ok(saved)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let conn = self.lock();
        let rows_affected = conn
            .execute(
                "UPDATE habits SET name = ?2, last_reset_at = ?3, is_active = ?4 WHERE id = ?1",
                params![
                    habit.id.value(),
                    habit.name,
                    format_timestamp(&habit.last_reset_at),
                    habit.is_active
                ],
            )
            .map_err(|e| map_name_conflict(e, &habit.name))?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id: habit.id });
        }
        self.publish_habits(&conn)?;

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError> {
        let conn = self.lock();
        let rows_affected = conn.execute("DELETE FROM habits WHERE id = ?1", params![habit_id.value()])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id });
        }
        self.publish_habits(&conn)?;
        self.publish_logs(&conn)?;

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn get_habit(&self, habit_id: HabitId) -> Result<Option<Habit>, StorageError> {
        let conn = self.lock();
        let habit = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
                params![habit_id.value()],
                row_to_habit,
            )
            .optional()?;
        Ok(habit)
    }

    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        query_habits(&self.lock())
    }

    fn subscribe_habits(&self) -> watch::Receiver<Vec<Habit>> {
        self.habits_tx.subscribe()
    }
}

impl LogStore for SqliteStorage {
    fn insert_log(&self, log: &HabitLog) -> Result<HabitLog, StorageError> {
        let conn = self.lock();
        let saved = insert_log_row(&conn, log)?;
        self.publish_logs(&conn)?;

        tracing::debug!("Created log {} for habit {}", saved.id, saved.habit_id);
        Ok(saved)
    }

    fn update_log(&self, log: &HabitLog) -> Result<(), StorageError> {
        let conn = self.lock();
        let rows_affected = conn.execute(
            "UPDATE habit_logs SET reset_trigger = ?2, notes = ?3 WHERE id = ?1",
            params![log.id.value(), log.trigger, log.notes],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::LogNotFound { log_id: log.id });
        }
        self.publish_logs(&conn)?;
        Ok(())
    }

    fn get_log(&self, log_id: LogId) -> Result<Option<HabitLog>, StorageError> {
        let conn = self.lock();
        let log = conn
            .query_row(
                &format!("SELECT {} FROM habit_logs WHERE id = ?1", LOG_COLUMNS),
                params![log_id.value()],
                row_to_log,
            )
            .optional()?;
        Ok(log)
    }

    fn logs_for_habit(&self, habit_id: HabitId) -> Result<Vec<HabitLog>, StorageError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habit_logs WHERE habit_id = ?1 ORDER BY created_at DESC, id DESC",
            LOG_COLUMNS
        ))?;
        let logs = stmt
            .query_map(params![habit_id.value()], row_to_log)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    fn longest_for_habit(&self, habit_id: HabitId) -> Result<Option<HabitLog>, StorageError> {
        let conn = self.lock();
        let log = conn
            .query_row(
                &format!(
                    "SELECT {} FROM habit_logs WHERE habit_id = ?1
                     ORDER BY streak_duration DESC, created_at DESC LIMIT 1",
                    LOG_COLUMNS
                ),
                params![habit_id.value()],
                row_to_log,
            )
            .optional()?;
        Ok(log)
    }

    fn list_logs(&self) -> Result<Vec<HabitLog>, StorageError> {
        query_logs(&self.lock())
    }

    fn record_reset(&self, habit: &Habit, log: &HabitLog) -> Result<HabitLog, StorageError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let saved = insert_log_row(&tx, log)?;
        let rows_affected = tx.execute(
            "UPDATE habits SET last_reset_at = ?2 WHERE id = ?1",
            params![habit.id.value(), format_timestamp(&habit.last_reset_at)],
        )?;
        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id: habit.id });
        }
        tx.commit()?;

        self.publish_habits(&conn)?;
        self.publish_logs(&conn)?;

        tracing::debug!(
            "Reset habit {} after {} days (log {})",
            habit.id, saved.streak_duration, saved.id
        );
        Ok(saved)
    }

    fn subscribe_logs(&self) -> watch::Receiver<Vec<HabitLog>> {
        self.logs_tx.subscribe()
    }
}

impl SettingsStore for SqliteStorage {
    fn get_string(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock();
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Timestamps are stored as fixed-width RFC 3339 so text order is time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
        })
}

fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let created_at: String = row.get(2)?;
    let last_reset_at: String = row.get(3)?;

    Ok(Habit::from_existing(
        HabitId(row.get(0)?),
        row.get(1)?, // name
        parse_timestamp(2, &created_at)?,
        parse_timestamp(3, &last_reset_at)?,
        row.get(4)?, // is_active
    ))
}

fn row_to_log(row: &Row<'_>) -> rusqlite::Result<HabitLog> {
    let created_at: String = row.get(3)?;

    Ok(HabitLog::from_existing(
        LogId(row.get(0)?),
        HabitId(row.get(1)?),
        row.get(2)?, // streak_duration
        parse_timestamp(3, &created_at)?,
        row.get(4)?, // reset_trigger
        row.get(5)?, // notes
    ))
}

fn query_habits(conn: &Connection) -> Result<Vec<Habit>, StorageError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM habits ORDER BY id", HABIT_COLUMNS))?;
    let habits = stmt.query_map([], row_to_habit)?.collect::<Result<Vec<_>, _>>()?;
    Ok(habits)
}

fn query_logs(conn: &Connection) -> Result<Vec<HabitLog>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habit_logs ORDER BY created_at DESC, id DESC",
        LOG_COLUMNS
    ))?;
    let logs = stmt.query_map([], row_to_log)?.collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}

fn insert_log_row(conn: &Connection, log: &HabitLog) -> Result<HabitLog, StorageError> {
    conn.execute(
        "INSERT INTO habit_logs (habit_id, streak_duration, created_at, reset_trigger, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            log.habit_id.value(),
            log.streak_duration,
            format_timestamp(&log.created_at),
            log.trigger,
            log.notes
        ],
    )
    .map_err(|e| {
        if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
            StorageError::HabitNotFound { habit_id: log.habit_id }
        } else {
            StorageError::Query(e)
        }
    })?;

    let mut saved = log.clone();
    saved.id = LogId(conn.last_insert_rowid());
    Ok(saved)
}

fn map_name_conflict(e: rusqlite::Error, name: &str) -> StorageError {
    if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
        StorageError::DuplicateName { name: name.to_string() }
    } else {
        StorageError::Query(e)
    }
}

fn is_constraint(e: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.extended_code == extended_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_habit_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = Habit::new("No Soda".to_string(), at(1) + Duration::nanoseconds(123)).unwrap();

        let saved = storage.insert_habit(&habit).unwrap();
        assert!(saved.id.value() > 0);
        assert_eq!(storage.get_habit(saved.id).unwrap(), Some(saved.clone()));
        assert_eq!(storage.get_habit(HabitId(999)).unwrap(), None);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.insert_habit(&Habit::new("Smoking".to_string(), at(1)).unwrap()).unwrap();
        let second = storage.insert_habit(&Habit::new("Smoking".to_string(), at(2)).unwrap());
        assert!(matches!(second, Err(StorageError::DuplicateName { .. })));

        let mut other = storage.insert_habit(&Habit::new("Vaping".to_string(), at(2)).unwrap()).unwrap();
        other.name = "Smoking".to_string();
        assert!(matches!(storage.update_habit(&other), Err(StorageError::DuplicateName { .. })));
    }

    #[test]
    fn test_logs_newest_first_and_longest() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = storage.insert_habit(&Habit::new("Sugar".to_string(), at(1)).unwrap()).unwrap();

        for (day, duration) in [(5, 4), (20, 15), (25, 5)] {
            let log = HabitLog::new(habit.id, duration, at(day), None, None).unwrap();
            storage.insert_log(&log).unwrap();
        }

        let logs = storage.logs_for_habit(habit.id).unwrap();
        let durations: Vec<i64> = logs.iter().map(|l| l.streak_duration).collect();
        assert_eq!(durations, vec![5, 15, 4]);
        assert_eq!(storage.longest_for_habit(habit.id).unwrap().unwrap().streak_duration, 15);
        assert_eq!(storage.longest_for_habit(HabitId(77)).unwrap(), None);
    }

    #[test]
    fn test_delete_cascades_to_logs() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = storage.insert_habit(&Habit::new("Sugar".to_string(), at(1)).unwrap()).unwrap();
        storage.insert_log(&HabitLog::new(habit.id, 3, at(4), None, None).unwrap()).unwrap();

        storage.delete_habit(habit.id).unwrap();
        assert!(storage.list_logs().unwrap().is_empty());
        assert!(matches!(storage.delete_habit(habit.id), Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_log_for_missing_habit_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        let log = HabitLog::new(HabitId(42), 3, at(4), None, None).unwrap();
        assert!(matches!(storage.insert_log(&log), Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_record_reset_is_atomic() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut habit = storage.insert_habit(&Habit::new("Sugar".to_string(), at(1)).unwrap()).unwrap();
        let log = habit.reset(at(11), Some("birthday".to_string()), None).unwrap();

        let saved = storage.record_reset(&habit, &log).unwrap();
        assert_eq!(saved.streak_duration, 10);
        assert_eq!(storage.get_habit(habit.id).unwrap().unwrap().last_reset_at, at(11));
        assert_eq!(storage.get_log(saved.id).unwrap().unwrap().trigger.as_deref(), Some("birthday"));
    }

    #[test]
    fn test_snapshots_follow_mutations() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut habits = storage.subscribe_habits();
        let mut logs = storage.subscribe_logs();
        assert!(habits.borrow_and_update().is_empty());

        let habit = storage.insert_habit(&Habit::new("Sugar".to_string(), at(1)).unwrap()).unwrap();
        assert!(habits.has_changed().unwrap());
        assert_eq!(habits.borrow_and_update().len(), 1);

        storage.insert_log(&HabitLog::new(habit.id, 2, at(3), None, None).unwrap()).unwrap();
        assert!(logs.has_changed().unwrap());
        assert_eq!(logs.borrow_and_update()[0].streak_duration, 2);
    }

    #[test]
    fn test_settings_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();

        assert_eq!(storage.get_string("missing").unwrap(), None);
        storage.set_bool("flag", true).unwrap();
        storage.set_int("count", -4).unwrap();
        storage.set_long("stamp", 1_700_000_000_000).unwrap();
        storage.set_string("name", "value").unwrap();
        storage.set_string("name", "replaced").unwrap();

        assert_eq!(storage.get_bool("flag").unwrap(), Some(true));
        assert_eq!(storage.get_int("count").unwrap(), Some(-4));
        assert_eq!(storage.get_long("stamp").unwrap(), Some(1_700_000_000_000));
        assert_eq!(storage.get_string("name").unwrap().as_deref(), Some("replaced"));

        assert!(matches!(storage.get_int("name"), Err(StorageError::CorruptValue { .. })));
        storage.remove("name").unwrap();
        assert_eq!(storage.get_string("name").unwrap(), None);
    }
}
