/// Analytics engine for classifying, ordering and ranking streaks
///
/// This module groups the pure streak computations: milestone classification
/// of live habits, sorting, the all-time best streak and the display
/// intensity. None of it performs I/O.

pub mod all_time;
pub mod intensity;
pub mod live;
pub mod sort;

pub use all_time::*;
pub use intensity::*;
pub use live::LiveAllTime;
pub use sort::*;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{AllTimeStreakResult, DomainError, Habit, HabitLog, MilestoneDefinition, MilestoneTable};

/// Analytics engine for processing habit data
///
/// Holds the milestone table and color palette so callers don't have to
/// thread them through every computation.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    table: Arc<MilestoneTable>,
    palette: IntensityPalette,
}

impl AnalyticsEngine {
    /// Create an engine over the standard milestone table
    pub fn new() -> Self {
        Self::with_table(Arc::new(MilestoneTable::standard()))
    }

    pub fn with_table(table: Arc<MilestoneTable>) -> Self {
        Self {
            table,
            palette: IntensityPalette::default(),
        }
    }

    pub fn table(&self) -> &Arc<MilestoneTable> {
        &self.table
    }

    pub fn classify(&self, days: i64) -> Result<&MilestoneDefinition, DomainError> {
        self.table.classify(days)
    }

    /// Pair every habit with the milestone of its ongoing streak
    pub fn classify_habits(
        &self,
        habits: Vec<Habit>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Habit, MilestoneDefinition)>, DomainError> {
        habits
            .into_iter()
            .map(|habit| {
                let milestone = self.table.classify(habit.streak_days(now))?.clone();
                Ok((habit, milestone))
            })
            .collect()
    }

    /// Classify and sort habits in one go
    pub fn sorted_habits(
        &self,
        habits: Vec<Habit>,
        order: SortOrder,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Habit, MilestoneDefinition)>, DomainError> {
        let mut entries = self.classify_habits(habits, now)?;
        sort_habits(&mut entries, order, now);
        Ok(entries)
    }

    pub fn all_time_best(
        &self,
        habits: &[Habit],
        logs: &[HabitLog],
        now: DateTime<Utc>,
    ) -> Result<Option<AllTimeStreakResult>, DomainError> {
        all_time_best(habits, logs, &self.table, now)
    }

    pub fn intensity(&self, days: i64) -> f32 {
        intensity(days)
    }

    /// Gradient colors for a streak length
    pub fn color_stops_for_days(&self, days: i64) -> ColorStops {
        self.palette.color_stops(intensity(days))
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}
