/// All-time best streak across live habits and closed logs

use chrono::{DateTime, Utc};

use crate::domain::{AllTimeStreakResult, DomainError, Habit, HabitLog, MilestoneTable};

/// The active habit with the longest ongoing streak
#[derive(Debug, Clone, PartialEq)]
pub struct OngoingCandidate {
    pub habit: Habit,
    pub days: i64,
}

/// Pick the active habit with the most days since its last reset
///
/// Equal day counts keep the first habit in input order.
pub fn best_ongoing(habits: &[Habit], now: DateTime<Utc>) -> Option<OngoingCandidate> {
    habits
        .iter()
        .filter(|h| h.is_active)
        .map(|h| OngoingCandidate { habit: h.clone(), days: h.streak_days(now) })
        .fold(None, |best: Option<OngoingCandidate>, candidate| match best {
            Some(b) if b.days >= candidate.days => Some(b),
            _ => Some(candidate),
        })
}

/// Pick the log with the longest recorded streak
///
/// Equal durations keep the first log in input order.
pub fn best_completed(logs: &[HabitLog]) -> Option<&HabitLog> {
    logs.iter().fold(None, |best: Option<&HabitLog>, log| match best {
        Some(b) if b.streak_duration >= log.streak_duration => Some(b),
        _ => Some(log),
    })
}

/// Reconcile the ongoing and completed candidates into one result
///
/// The ongoing streak only wins when it is strictly longer; a tie goes to the
/// completed streak. Zero-length results are not surfaced.
pub fn aggregate(
    ongoing: Option<&OngoingCandidate>,
    completed: Option<&HabitLog>,
    table: &MilestoneTable,
) -> Result<Option<AllTimeStreakResult>, DomainError> {
    let ongoing_days = ongoing.map(|o| o.days).unwrap_or(0);
    let completed_days = completed.map(|c| c.streak_duration).unwrap_or(0);
    if ongoing_days == 0 && completed_days == 0 {
        return Ok(None);
    }

    let result = match (ongoing, completed) {
        (None, None) => return Ok(None),
        (Some(o), Some(c)) if o.days > c.streak_duration => from_ongoing(o, table)?,
        (Some(_), Some(c)) => from_completed(c, table)?,
        (None, Some(c)) => from_completed(c, table)?,
        (Some(o), None) => from_ongoing(o, table)?,
    };
    Ok(Some(result))
}

/// Snapshot form: pick both candidates and aggregate them
pub fn all_time_best(
    habits: &[Habit],
    logs: &[HabitLog],
    table: &MilestoneTable,
    now: DateTime<Utc>,
) -> Result<Option<AllTimeStreakResult>, DomainError> {
    let ongoing = best_ongoing(habits, now);
    aggregate(ongoing.as_ref(), best_completed(logs), table)
}

fn from_ongoing(o: &OngoingCandidate, table: &MilestoneTable) -> Result<AllTimeStreakResult, DomainError> {
    Ok(AllTimeStreakResult {
        habit_id: o.habit.id,
        days: o.days,
        milestone: table.classify(o.days)?.clone(),
        start: o.habit.last_reset_at,
        end: None,
    })
}

fn from_completed(c: &HabitLog, table: &MilestoneTable) -> Result<AllTimeStreakResult, DomainError> {
    Ok(AllTimeStreakResult {
        habit_id: c.habit_id,
        days: c.streak_duration,
        milestone: table.classify(c.streak_duration)?.clone(),
        start: c.started_at(),
        end: Some(c.created_at),
    })
}
