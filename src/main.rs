/// Main entry point for the habit milestones CLI
///
/// This file sets up logging, parses command line arguments and dispatches
/// to the habit operations. Results are printed to stdout as JSON; logs and
/// notifications go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use habit_milestones::storage::KEY_NOTIFICATIONS_ENABLED;
use habit_milestones::tools::{self, *};
use habit_milestones::{
    BackoffPolicy, DaemonOptions, HabitId, HabitMilestonesApp, LogId, NotifierConfig,
    ScheduleConstraints, SettingsStore, SortOrder,
};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".habit_milestones");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_milestones");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("habit_milestones");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_milestones");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if let Ok(()) = std::fs::create_dir_all(potential_path) {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_milestones");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the habit milestones CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Notifier tuning shared by `notify` and `daemon`
#[derive(clap::Args, Debug)]
struct NotifierArgs {
    /// Fraction of a milestone's minimum days at which a habit counts as close
    #[arg(long, default_value_t = habit_milestones::notifier::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Days between notifier runs
    #[arg(long, default_value_t = habit_milestones::notifier::DEFAULT_INTERVAL_DAYS)]
    interval_days: u32,
}

impl NotifierArgs {
    fn config(&self) -> NotifierConfig {
        NotifierConfig {
            threshold: self.threshold,
            interval_days: self.interval_days,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start tracking a new habit
    Add { name: String },

    /// Rename a habit
    Rename { habit_id: HabitId, name: String },

    /// Close the current streak of a habit and start over
    Reset {
        habit_id: HabitId,
        #[arg(long)]
        trigger: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Pause a habit
    Pause { habit_id: HabitId },

    /// Resume a paused habit
    Resume { habit_id: HabitId },

    /// Delete a habit and all its logs
    Delete { habit_id: HabitId },

    /// List habits with their current streaks
    List {
        /// Sort order as `key[:dir]`, keys: name, created, streak; dirs: asc, desc
        #[arg(long)]
        sort: Option<SortOrder>,
        #[arg(long)]
        active_only: bool,
    },

    /// Show the past streaks of a habit
    History { habit_id: HabitId },

    /// Change the trigger and notes of a past streak
    EditLog {
        log_id: LogId,
        #[arg(long)]
        trigger: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show the best streak across all habits
    Best,

    /// Run the milestone notifier once
    Notify {
        #[command(flatten)]
        notifier: NotifierArgs,
    },

    /// Run the milestone notifier periodically until interrupted
    Daemon {
        #[command(flatten)]
        notifier: NotifierArgs,

        /// Seconds to wait before the first run
        #[arg(long, default_value_t = 0)]
        initial_delay_secs: u64,

        /// Base delay between retries of a failed run, multiplied by the attempt
        #[arg(long, default_value_t = 30)]
        backoff_secs: u64,

        /// Tries per run before waiting for the next interval
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,
    },

    /// Turn milestone notifications on or off
    Notifications {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Save the order `list` uses when no `--sort` is given
    DefaultSort { order: SortOrder },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_milestones={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for JSON output
        .init();

    // Determine database path
    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let app = HabitMilestonesApp::new(db_path)?;
    let storage = app.storage();
    let engine = app.analytics();
    let now = Utc::now();

    match args.command {
        Command::Add { name } => {
            print_json(&create_habit(storage, CreateHabitParams { name }, now)?)?;
        }
        Command::Rename { habit_id, name } => {
            print_json(&rename_habit(storage, RenameHabitParams { habit_id, name })?)?;
        }
        Command::Reset { habit_id, trigger, notes } => {
            let params = ResetHabitParams { habit_id, trigger, notes };
            print_json(&reset_habit(storage, engine, params, now)?)?;
        }
        Command::Pause { habit_id } => {
            let params = SetHabitActiveParams { habit_id, is_active: false };
            print_json(&set_habit_active(storage, params)?)?;
        }
        Command::Resume { habit_id } => {
            let params = SetHabitActiveParams { habit_id, is_active: true };
            print_json(&set_habit_active(storage, params)?)?;
        }
        Command::Delete { habit_id } => {
            print_json(&delete_habit(storage, DeleteHabitParams { habit_id })?)?;
        }
        Command::List { sort, active_only } => {
            let params = ListHabitsParams {
                sort,
                active_only: Some(active_only),
            };
            print_json(&list_habits(storage, engine, params, now)?)?;
        }
        Command::History { habit_id } => {
            print_json(&habit_history(storage, engine, HabitHistoryParams { habit_id }, now)?)?;
        }
        Command::EditLog { log_id, trigger, notes } => {
            print_json(&edit_log(storage, EditLogParams { log_id, trigger, notes })?)?;
        }
        Command::Best => {
            print_json(&tools::all_time_best(storage, engine, now)?)?;
        }
        Command::Notify { notifier } => {
            let outcome = app.notifier(notifier.config())?.run_at(now).await?;
            print_json(&outcome)?;
        }
        Command::Daemon {
            notifier,
            initial_delay_secs,
            backoff_secs,
            max_attempts,
        } => {
            let options = DaemonOptions {
                notifier: notifier.config(),
                constraints: ScheduleConstraints {
                    initial_delay: Duration::from_secs(initial_delay_secs),
                },
                backoff: BackoffPolicy::linear(Duration::from_secs(backoff_secs), max_attempts),
            };
            app.run_daemon(options).await?;
        }
        Command::Notifications { enabled } => {
            storage.set_bool(KEY_NOTIFICATIONS_ENABLED, enabled)?;
            print_json(&serde_json::json!({
                "success": true,
                "notifications_enabled": enabled,
            }))?;
        }
        Command::DefaultSort { order } => {
            set_default_sort_order(storage, order)?;
            print_json(&serde_json::json!({
                "success": true,
                "default_sort": order.to_string(),
            }))?;
        }
    }

    Ok(())
}
