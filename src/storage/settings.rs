/// Typed key/value settings
///
/// Values are stored as text; the typed accessors parse on read and report
/// unparseable values as `StorageError::CorruptValue`.

use crate::storage::StorageError;

/// Whether milestone notifications may be shown
pub const KEY_NOTIFICATIONS_ENABLED: &str = "notifications_enabled";
/// Last set of habits the milestone notifier alerted about
pub const KEY_NOTIFIED_MILESTONES: &str = "notified_milestone_habits";
/// Default ordering of the habit list
pub const KEY_SORT_ORDER: &str = "habit_sort_order";

/// Key/value persistence for app preferences and small engine state
pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        parse_setting(key, self.get_string(key)?)
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.set_string(key, &value.to_string())
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, StorageError> {
        parse_setting(key, self.get_string(key)?)
    }

    fn set_int(&self, key: &str, value: i32) -> Result<(), StorageError> {
        self.set_string(key, &value.to_string())
    }

    fn get_long(&self, key: &str) -> Result<Option<i64>, StorageError> {
        parse_setting(key, self.get_string(key)?)
    }

    fn set_long(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.set_string(key, &value.to_string())
    }
}

/// Parse a raw setting with `FromStr`
fn parse_setting<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, StorageError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| StorageError::CorruptValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}
