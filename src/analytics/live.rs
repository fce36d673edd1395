/// Live all-time best streak
///
/// Keeps an `AllTimeStreakResult` current by listening to the habit and log
/// snapshots published by the store. Either side changing triggers a
/// recompute against the latest value of both (combine-latest, not zip).

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::analytics::all_time_best;
use crate::domain::{AllTimeStreakResult, DomainError, Habit, HabitLog, MilestoneTable};

/// Handle to a running all-time best subscription
pub struct LiveAllTime {
    receiver: watch::Receiver<Option<AllTimeStreakResult>>,
    task: JoinHandle<()>,
}

impl LiveAllTime {
    /// Start recomputing from the two upstream snapshots
    ///
    /// The returned receiver already holds the result for the current
    /// snapshots. The task ends when either upstream sender is dropped.
    /// A malformed table is rejected before anything is spawned.
    pub fn spawn(
        table: Arc<MilestoneTable>,
        mut habits: watch::Receiver<Vec<Habit>>,
        mut logs: watch::Receiver<Vec<HabitLog>>,
    ) -> Result<Self, DomainError> {
        table.validate()?;

        let initial = compute(&table, &mut habits, &mut logs);
        let (tx, receiver) = watch::channel(initial);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = habits.changed() => {
                        if changed.is_err() {
                            debug!("Habit snapshots closed, stopping all-time subscription");
                            break;
                        }
                    }
                    changed = logs.changed() => {
                        if changed.is_err() {
                            debug!("Log snapshots closed, stopping all-time subscription");
                            break;
                        }
                    }
                }

                let result = compute(&table, &mut habits, &mut logs);
                if tx.send(result).is_err() {
                    // Nobody is listening anymore
                    break;
                }
            }
        });

        Ok(Self { receiver, task })
    }

    /// A receiver that observes every recomputed result
    pub fn subscribe(&self) -> watch::Receiver<Option<AllTimeStreakResult>> {
        self.receiver.clone()
    }

    /// The most recently computed result
    pub fn current(&self) -> Option<AllTimeStreakResult> {
        self.receiver.borrow().clone()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

/// Aggregate the latest value of both sides, marking both as seen
///
/// The table is validated up front, so the only error left is a habit whose
/// reset anchor lies in the future; that snapshot publishes no result.
fn compute(
    table: &MilestoneTable,
    habits: &mut watch::Receiver<Vec<Habit>>,
    logs: &mut watch::Receiver<Vec<HabitLog>>,
) -> Option<AllTimeStreakResult> {
    let habits = habits.borrow_and_update().clone();
    let logs = logs.borrow_and_update().clone();

    match all_time_best(&habits, &logs, table, Utc::now()) {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Failed to compute all-time best streak");
            None
        }
    }
}
