/// Milestone tiers and streak classification
///
/// A milestone table is an ordered list of contiguous day ranges. Every
/// non-negative day count falls into exactly one of them.

use serde::{Deserialize, Serialize};
use crate::domain::DomainError;

/// Upper bound of the final, open-ended tier
pub const UNBOUNDED_DAYS: i64 = i64::MAX;

/// A named streak tier covering `[min_days, max_days]` inclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDefinition {
    /// Display title (e.g., "One Month")
    pub title: String,
    /// First day count in this tier
    pub min_days: i64,
    /// Last day count in this tier (`UNBOUNDED_DAYS` for the final tier)
    pub max_days: i64,
    /// Badge asset reference
    pub badge: String,
    /// Message shown alongside the badge
    pub message: String,
}

impl MilestoneDefinition {
    pub fn new(title: &str, min_days: i64, max_days: i64, badge: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            min_days,
            max_days,
            badge: badge.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether `days` falls inside this tier
    pub fn contains(&self, days: i64) -> bool {
        self.min_days <= days && days <= self.max_days
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_days == UNBOUNDED_DAYS
    }
}

/// Ordered, read-only catalog of milestones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneTable {
    milestones: Vec<MilestoneDefinition>,
}

impl MilestoneTable {
    /// Build a table, rejecting gaps, overlaps and a missing sentinel
    pub fn new(milestones: Vec<MilestoneDefinition>) -> Result<Self, DomainError> {
        let table = Self { milestones };
        table.validate()?;
        Ok(table)
    }

    /// Build a table without checking its shape
    ///
    /// A malformed table still loads; `classify` reports the hole as
    /// `NoMilestoneFound` when a day count lands in it.
    pub fn from_definitions_unchecked(milestones: Vec<MilestoneDefinition>) -> Self {
        Self { milestones }
    }

    /// The catalog shipped with the app
    pub fn standard() -> Self {
        Self::from_definitions_unchecked(vec![
            MilestoneDefinition::new(
                "Fresh Start", 0, 6, "badge_seedling",
                "Every streak starts at day zero. Keep going!",
            ),
            MilestoneDefinition::new(
                "One Week", 7, 13, "badge_sprout",
                "A full week behind you. The first one is the hardest.",
            ),
            MilestoneDefinition::new(
                "Two Weeks", 14, 29, "badge_leaf",
                "Two weeks strong. The routine is taking root.",
            ),
            MilestoneDefinition::new(
                "One Month", 30, 59, "badge_branch",
                "A whole month. This is becoming who you are.",
            ),
            MilestoneDefinition::new(
                "Two Months", 60, 89, "badge_sapling",
                "Two months of steady progress.",
            ),
            MilestoneDefinition::new(
                "Three Months", 90, 179, "badge_tree",
                "A full season. Cravings are getting quieter.",
            ),
            MilestoneDefinition::new(
                "Six Months", 180, 364, "badge_grove",
                "Half a year. You have built something lasting.",
            ),
            MilestoneDefinition::new(
                "One Year", 365, 729, "badge_forest",
                "One year. Take a moment to celebrate.",
            ),
            MilestoneDefinition::new(
                "Two Years", 730, 1094, "badge_mountain",
                "Two years of commitment.",
            ),
            MilestoneDefinition::new(
                "Three Years", 1095, UNBOUNDED_DAYS, "badge_summit",
                "Three years and beyond. Legendary.",
            ),
        ])
    }

    pub fn milestones(&self) -> &[MilestoneDefinition] {
        &self.milestones
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// Find the single tier containing `days`
    pub fn classify(&self, days: i64) -> Result<&MilestoneDefinition, DomainError> {
        // Last tier whose minimum is <= days, then confirm the upper bound.
        let idx = self.milestones.partition_point(|m| m.min_days <= days);
        idx.checked_sub(1)
            .and_then(|i| self.milestones.get(i))
            .filter(|m| m.contains(days))
            .ok_or(DomainError::NoMilestoneFound { days })
    }

    /// The tier after the one containing `days`, if any
    pub fn next_milestone(&self, days: i64) -> Option<&MilestoneDefinition> {
        self.milestones.iter().find(|m| m.min_days > days)
    }

    /// Check the ordering invariants of the table
    pub fn validate(&self) -> Result<(), DomainError> {
        let first = self.milestones.first().ok_or_else(|| {
            DomainError::MalformedMilestoneTable("table is empty".to_string())
        })?;

        if first.min_days != 0 {
            return Err(DomainError::MalformedMilestoneTable(format!(
                "first tier '{}' starts at {} instead of 0",
                first.title, first.min_days
            )));
        }

        for m in &self.milestones {
            if m.max_days < m.min_days {
                return Err(DomainError::MalformedMilestoneTable(format!(
                    "tier '{}' has max {} below min {}",
                    m.title, m.max_days, m.min_days
                )));
            }
        }

        for pair in self.milestones.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.max_days == UNBOUNDED_DAYS || prev.max_days + 1 != next.min_days {
                return Err(DomainError::MalformedMilestoneTable(format!(
                    "tier '{}' ends at {} but '{}' starts at {}",
                    prev.title, prev.max_days, next.title, next.min_days
                )));
            }
        }

        // first() succeeded above, so last() exists
        if let Some(last) = self.milestones.last() {
            if !last.is_unbounded() {
                return Err(DomainError::MalformedMilestoneTable(format!(
                    "last tier '{}' ends at {} instead of being unbounded",
                    last.title, last.max_days
                )));
            }
        }

        Ok(())
    }
}

impl Default for MilestoneTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_well_formed() {
        assert!(MilestoneTable::standard().validate().is_ok());
    }

    #[test]
    fn test_classification_covers_every_day() {
        let table = MilestoneTable::standard();
        for days in 0..=10_000 {
            let milestone = table.classify(days).unwrap();
            assert!(milestone.min_days <= days && days <= milestone.max_days);
            let matches = table.milestones().iter().filter(|m| m.contains(days)).count();
            assert_eq!(matches, 1, "day {} matched {} tiers", days, matches);
        }
    }

    #[test]
    fn test_classify_boundaries() {
        let table = MilestoneTable::standard();
        assert_eq!(table.classify(0).unwrap().title, "Fresh Start");
        assert_eq!(table.classify(6).unwrap().title, "Fresh Start");
        assert_eq!(table.classify(7).unwrap().title, "One Week");
        assert_eq!(table.classify(45).unwrap().title, "One Month");
        assert_eq!(table.classify(90).unwrap().title, "Three Months");
        assert_eq!(table.classify(i64::MAX).unwrap().title, "Three Years");
    }

    #[test]
    fn test_negative_days_have_no_milestone() {
        let table = MilestoneTable::standard();
        assert_eq!(table.classify(-1), Err(DomainError::NoMilestoneFound { days: -1 }));
    }

    #[test]
    fn test_gap_surfaces_as_no_milestone() {
        let table = MilestoneTable::from_definitions_unchecked(vec![
            MilestoneDefinition::new("A", 0, 9, "a", "a"),
            MilestoneDefinition::new("B", 20, UNBOUNDED_DAYS, "b", "b"),
        ]);
        assert!(table.validate().is_err());
        assert_eq!(table.classify(5).unwrap().title, "A");
        assert_eq!(table.classify(15), Err(DomainError::NoMilestoneFound { days: 15 }));
    }

    #[test]
    fn test_missing_sentinel_rejected() {
        let result = MilestoneTable::new(vec![
            MilestoneDefinition::new("A", 0, 9, "a", "a"),
            MilestoneDefinition::new("B", 10, 99, "b", "b"),
        ]);
        assert!(matches!(result, Err(DomainError::MalformedMilestoneTable(_))));

        let table = MilestoneTable::from_definitions_unchecked(vec![
            MilestoneDefinition::new("A", 0, 9, "a", "a"),
        ]);
        assert!(table.classify(10).is_err());
    }

    #[test]
    fn test_next_milestone() {
        let table = MilestoneTable::standard();
        assert_eq!(table.next_milestone(45).unwrap().title, "Two Months");
        assert_eq!(table.next_milestone(0).unwrap().title, "One Week");
        assert!(table.next_milestone(2000).is_none());
    }
}
