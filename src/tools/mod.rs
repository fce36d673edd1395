/// Habit operations
///
/// Each operation takes a Params struct, works against the storage traits and
/// returns a serializable Response, so the CLI (or any other front end) only
/// has to decode arguments and print the result.

pub mod best;
pub mod create;
pub mod delete;
pub mod history;
pub mod list;
pub mod reset;
pub mod update;

// Re-export tool functions for easy access
pub use best::*;
pub use create::*;
pub use delete::*;
pub use history::*;
pub use list::*;
pub use reset::*;
pub use update::*;

use thiserror::Error;

use crate::domain::{DomainError, HabitId, LogId};
use crate::storage::StorageError;

/// Errors a habit operation can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ToolError {
    pub(crate) fn habit_not_found(habit_id: HabitId) -> Self {
        ToolError::Storage(StorageError::HabitNotFound { habit_id })
    }

    pub(crate) fn log_not_found(log_id: LogId) -> Self {
        ToolError::Storage(StorageError::LogNotFound { log_id })
    }
}
