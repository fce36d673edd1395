/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitLog, MilestoneDefinition)
/// and the pure streak arithmetic built on top of them. Nothing in here touches
/// storage or the clock on its own - callers always pass `now` in.

pub mod habit;
pub mod log;
pub mod milestone;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use log::*;
pub use milestone::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// No milestone range contains the day count. Only a malformed table
    /// (or a negative count from a future reset date) can produce this.
    #[error("No milestone found for a streak of {days} days")]
    NoMilestoneFound { days: i64 },

    #[error("Malformed milestone table: {0}")]
    MalformedMilestoneTable(String),
}
