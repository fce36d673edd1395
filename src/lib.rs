/// Public library interface for the habit milestone engine
///
/// This module wires the SQLite store, the analytics engine, the milestone
/// notifier and its scheduler together. The pieces are also exported on
/// their own for embedding and tests.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

pub mod analytics;
pub mod domain;
pub mod notifier;
pub mod scheduler;
pub mod storage;
pub mod tools;

// Re-export public modules and types
pub use analytics::{AnalyticsEngine, LiveAllTime, SortDirection, SortKey, SortOrder};
pub use domain::*;
pub use notifier::{
    MilestoneNotifier, NotificationSink, NotifierConfig, NotifierError, NotifierOutcome,
    TracingNotificationSink,
};
pub use scheduler::{BackoffPolicy, ScheduleConstraints, Scheduler};
pub use storage::{HabitStore, LogStore, SettingsStore, SqliteStorage, StorageError};
pub use tools::ToolError;

/// Name the notifier job is scheduled under
pub const NOTIFIER_JOB: &str = "milestone-notifier";

/// Errors that can occur while running the app
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("Notifier error: {0}")]
    Notifier(#[from] NotifierError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How the background notifier is run
#[derive(Debug, Clone, Copy, Default)]
pub struct DaemonOptions {
    pub notifier: NotifierConfig,
    pub constraints: ScheduleConstraints,
    pub backoff: BackoffPolicy,
}

/// The habit milestone app over one SQLite database
pub struct HabitMilestonesApp {
    storage: Arc<SqliteStorage>,
    analytics: AnalyticsEngine,
}

impl HabitMilestonesApp {
    /// Open (and migrate if needed) the database at `db_path`
    pub fn new(db_path: PathBuf) -> Result<Self, AppError> {
        info!("Initializing habit milestones with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::with_storage(Arc::new(storage), AnalyticsEngine::new()))
    }

    pub fn with_storage(storage: Arc<SqliteStorage>, analytics: AnalyticsEngine) -> Self {
        Self { storage, analytics }
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn analytics(&self) -> &AnalyticsEngine {
        &self.analytics
    }

    /// A notifier that alerts through the log
    pub fn notifier(&self, config: NotifierConfig) -> Result<MilestoneNotifier, AppError> {
        let sink = Arc::new(TracingNotificationSink::new(self.storage.clone()));
        self.notifier_with_sink(config, sink)
    }

    pub fn notifier_with_sink(
        &self,
        config: NotifierConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<MilestoneNotifier, AppError> {
        let notifier = MilestoneNotifier::new(
            self.storage.clone(),
            self.storage.clone(),
            sink,
            self.analytics.table().clone(),
            config,
        )?;
        Ok(notifier)
    }

    /// Keep the all-time best streak current as the store changes
    ///
    /// Must be called from within a tokio runtime.
    pub fn live_all_time(&self) -> Result<LiveAllTime, AppError> {
        let live = LiveAllTime::spawn(
            self.analytics.table().clone(),
            self.storage.subscribe_habits(),
            self.storage.subscribe_logs(),
        )?;
        Ok(live)
    }

    /// Schedule the notifier on `scheduler`, replacing any earlier instance
    pub fn schedule_notifier(&self, scheduler: &Scheduler, options: DaemonOptions) -> Result<(), AppError> {
        let notifier = Arc::new(self.notifier(options.notifier)?);
        let interval = scheduler::days(options.notifier.interval_days);

        scheduler.schedule_recurring(interval, options.constraints, options.backoff, move || {
            let notifier = notifier.clone();
            async move { notifier.run().await }
        });
        Ok(())
    }

    /// Run the notifier in the background until ctrl-c
    pub async fn run_daemon(self, options: DaemonOptions) -> Result<(), AppError> {
        let habits = self.storage.list_habits()?;
        info!("Daemon starting, found {} existing habits", habits.len());

        let live = self.live_all_time()?;
        let scheduler = Scheduler::new(NOTIFIER_JOB);
        self.schedule_notifier(&scheduler, options)?;

        let mut best = live.subscribe();
        let watcher = tokio::spawn(async move {
            while best.changed().await.is_ok() {
                match best.borrow_and_update().as_ref() {
                    Some(result) => info!(
                        habit_id = %result.habit_id,
                        days = result.days,
                        ongoing = result.is_ongoing(),
                        "All-time best streak is now {} days", result.days
                    ),
                    None => info!("No all-time best streak yet"),
                }
            }
        });

        let shutdown = tokio::signal::ctrl_c().await;
        if let Err(e) = &shutdown {
            warn!("Failed to listen for shutdown signal: {}", e);
        }

        info!("Shutting down daemon");
        scheduler.cancel();
        watcher.abort();
        live.stop();
        shutdown?;
        Ok(())
    }
}
