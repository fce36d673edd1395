/// Storage layer for persisting habit data
///
/// This module defines the store interfaces the streak engine consumes
/// (habits, closed-streak logs, key/value settings) and the SQLite
/// implementation of all three.

pub mod migrations;
pub mod settings;
pub mod sqlite;

// Re-export the main storage types
pub use settings::*;
pub use sqlite::*;

use thiserror::Error;
use tokio::sync::watch;
use crate::domain::{Habit, HabitId, HabitLog, LogId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Log not found: {log_id}")]
    LogNotFound { log_id: LogId },

    #[error("A habit named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Setting '{key}' holds an unreadable value: {value}")]
    CorruptValue { key: String, value: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Habit persistence
///
/// Implementations publish a fresh snapshot of all habits to subscribers
/// after every successful mutation.
pub trait HabitStore: Send + Sync {
    /// Persist a new habit and return it with its assigned id
    ///
    /// Fails with `DuplicateName` if the name is taken.
    fn insert_habit(&self, habit: &Habit) -> Result<Habit, StorageError>;

    /// Update name, reset anchor and active flag of an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit and, by cascade, its logs
    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError>;

    /// Look a habit up; a missing habit is `None`, not an error
    fn get_habit(&self, habit_id: HabitId) -> Result<Option<Habit>, StorageError>;

    /// Point-in-time snapshot of every habit
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Receiver that always holds the latest snapshot of every habit
    fn subscribe_habits(&self) -> watch::Receiver<Vec<Habit>>;
}

/// Closed-streak log persistence
pub trait LogStore: Send + Sync {
    /// Persist a new log and return it with its assigned id
    fn insert_log(&self, log: &HabitLog) -> Result<HabitLog, StorageError>;

    /// Update the editable fields (trigger, notes) of a log
    fn update_log(&self, log: &HabitLog) -> Result<(), StorageError>;

    fn get_log(&self, log_id: LogId) -> Result<Option<HabitLog>, StorageError>;

    /// Logs of one habit, newest first
    fn logs_for_habit(&self, habit_id: HabitId) -> Result<Vec<HabitLog>, StorageError>;

    /// The log with the longest streak for one habit
    fn longest_for_habit(&self, habit_id: HabitId) -> Result<Option<HabitLog>, StorageError>;

    /// Every log of every habit, newest first
    fn list_logs(&self) -> Result<Vec<HabitLog>, StorageError>;

    /// Store a closed streak and the habit's new reset anchor together
    fn record_reset(&self, habit: &Habit, log: &HabitLog) -> Result<HabitLog, StorageError>;

    /// Receiver that always holds the latest snapshot of every log
    fn subscribe_logs(&self) -> watch::Receiver<Vec<HabitLog>>;
}
