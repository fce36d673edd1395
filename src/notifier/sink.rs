/// Where milestone alerts are delivered

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{Habit, MilestoneDefinition};
use crate::storage::{SettingsStore, StorageError, KEY_NOTIFICATIONS_ENABLED};

/// Delivery channel for milestone notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Whether alerts may currently be shown
    async fn is_enabled(&self) -> Result<bool, StorageError>;

    /// Alert about a single habit approaching `next`
    async fn notify_single(
        &self,
        habit: &Habit,
        next: Option<&MilestoneDefinition>,
    ) -> Result<(), StorageError>;

    /// Alert that `count` habits are approaching a milestone
    async fn notify_count(&self, count: usize) -> Result<(), StorageError>;
}

/// Sink that writes alerts to the log
///
/// Notifications default to enabled until the user turns them off in
/// settings.
pub struct TracingNotificationSink {
    settings: Arc<dyn SettingsStore>,
}

impl TracingNotificationSink {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn is_enabled(&self) -> Result<bool, StorageError> {
        match self.settings.get_bool(KEY_NOTIFICATIONS_ENABLED) {
            Ok(flag) => Ok(flag.unwrap_or(true)),
            Err(StorageError::CorruptValue { key, value }) => {
                warn!(%key, %value, "Unreadable notification preference, treating as enabled");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    async fn notify_single(
        &self,
        habit: &Habit,
        next: Option<&MilestoneDefinition>,
    ) -> Result<(), StorageError> {
        match next {
            Some(milestone) => info!(
                habit_id = %habit.id,
                milestone = %milestone.title,
                "🏆 {} is about to reach {}!", habit.name, milestone.title
            ),
            None => info!(habit_id = %habit.id, "🏆 {} is about to reach a new milestone!", habit.name),
        }
        Ok(())
    }

    async fn notify_count(&self, count: usize) -> Result<(), StorageError> {
        info!(count, "🏆 {} habits are about to reach a new milestone!", count);
        Ok(())
    }
}
