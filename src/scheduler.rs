//! Recurring background jobs.
//!
//! A [`Scheduler`] owns at most one live instance of its job. Scheduling again
//! aborts the running instance and replaces it. Failed runs (errors or panics)
//! are retried with a linear backoff before the job waits for its next interval.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const SECONDS_PER_DAY: u64 = 86_400;

/// Retry policy for a failed run: wait `initial_delay * attempt` between tries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    /// Total tries per scheduled run, including the first
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub fn linear(initial_delay: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Delay after the `attempt`-th failed try (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(attempt)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::linear(Duration::from_secs(30), 3)
    }
}

/// Conditions applied before a recurring job first runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleConstraints {
    /// Wait this long before the first run
    pub initial_delay: Duration,
}

/// Interval length for a whole number of days
pub fn days(count: u32) -> Duration {
    Duration::from_secs(count as u64 * SECONDS_PER_DAY)
}

/// Runs one named recurring job, one instance at a time
pub struct Scheduler {
    name: String,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            current: Mutex::new(None),
        }
    }

    /// Start the job every `interval`, replacing any instance already scheduled
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule_recurring<F, Fut, T, E>(
        &self,
        interval: Duration,
        constraints: ScheduleConstraints,
        backoff: BackoffPolicy,
        job: F,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Debug,
        E: Display,
    {
        let name = self.name.clone();
        let handle = tokio::spawn(async move {
            if !constraints.initial_delay.is_zero() {
                tokio::time::sleep(constraints.initial_delay).await;
            }
            loop {
                run_with_backoff(&name, &job, &backoff).await;
                tokio::time::sleep(interval).await;
            }
        });

        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(handle) {
            previous.abort();
            info!(job = %self.name, "Replaced scheduled job instance");
        } else {
            info!(job = %self.name, interval_secs = interval.as_secs(), "Scheduled recurring job");
        }
    }

    /// Stop the scheduled instance, if any
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = current.take() {
            handle.abort();
            info!(job = %self.name, "Cancelled recurring job");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `job` until it succeeds or the attempts are used up
///
/// Returns whether a try succeeded. Panics count as failures.
pub async fn run_with_backoff<F, Fut, T, E>(name: &str, job: &F, backoff: &BackoffPolicy) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: Debug,
    E: Display,
{
    for attempt in 1..=backoff.max_attempts {
        debug!(job = %name, attempt, "Job starting");
        match AssertUnwindSafe(job()).catch_unwind().await {
            Ok(Ok(output)) => {
                if attempt > 1 {
                    info!(job = %name, attempt, "Job recovered after retry");
                }
                debug!(job = %name, ?output, "Job completed");
                return true;
            }
            Ok(Err(e)) => {
                warn!(job = %name, attempt, error = %e, "Job failed");
            }
            Err(_) => {
                error!(job = %name, attempt, "Job panicked");
            }
        }

        if attempt < backoff.max_attempts {
            let delay = backoff.delay(attempt);
            debug!(job = %name, backoff_secs = delay.as_secs(), "Backing off before retry");
            tokio::time::sleep(delay).await;
        }
    }

    error!(
        job = %name,
        attempts = backoff.max_attempts,
        "Job failed on every attempt, waiting for next interval"
    );
    false
}
