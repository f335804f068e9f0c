// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge catalog models: definitions, criteria, tiers, thresholds.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::Activity;

/// Award tier, ordered bronze < silver < gold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    /// All tiers from highest to lowest, the order the awarder checks them.
    pub const DESCENDING: [Tier; 3] = [Tier::Gold, Tier::Silver, Tier::Bronze];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge family, selecting which tier point table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeFamily {
    /// Regular per-activity badges (3/6/10 points by default).
    Standard,
    /// Group-workout badges awarded by the detector (3/6/15 by default).
    Group,
}

/// How a badge accumulates progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriteriaType {
    /// +1 per activity satisfying the badge condition.
    Count,
    /// Lifetime sum of a metric.
    Cumulative,
    /// Best single-activity value of an instantaneous metric.
    SingleActivity,
    /// Longest run of consecutive active weeks ending at the latest one.
    WeeklyStreak,
    /// Cardinality of the set of distinct sport types.
    UniqueSports,
    /// Sum of a metric within the current week's row.
    WeeklyCumulative,
    /// Number of distinct weeks in which the condition held at least once.
    WeeklyCount,
    /// Awarded by the group activity detector, never by the per-activity
    /// pipeline.
    GroupActivity,
}

/// Metric extracted from an activity for cumulative/single-activity badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    DistanceKm,
    DistanceMiles,
    ElevationGain,
    MovingTimeHours,
    SufferScore,
    CaloriesPerHour,
    AverageSpeedKmh,
}

/// Boolean condition over a single activity's fields, used by the
/// count-style criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActivityCondition {
    /// Local wall-clock start hour strictly before `hour` (early bird).
    StartHourBefore { hour: u32 },
    /// Local wall-clock start hour at or after `hour` (night owl).
    StartHourAtOrAfter { hour: u32 },
    /// At least `count` photos attached.
    MinPhotoCount { count: u32 },
}

impl ActivityCondition {
    /// Evaluate the condition against one activity.
    pub fn holds(&self, activity: &Activity) -> bool {
        match self {
            ActivityCondition::StartHourBefore { hour } => activity.local_start_hour() < *hour,
            ActivityCondition::StartHourAtOrAfter { hour } => {
                activity.local_start_hour() >= *hour
            }
            ActivityCondition::MinPhotoCount { count } => activity.photo_count >= *count,
        }
    }
}

/// When badge progress resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPeriod {
    /// Progress accumulates forever.
    None,
    /// One progress row per ISO week (Monday-start, UTC).
    Weekly,
}

/// Bronze/silver/gold thresholds in the badge's metric units.
///
/// Must be strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub bronze: f64,
    pub silver: f64,
    pub gold: f64,
}

impl Thresholds {
    pub fn value_for(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Bronze => self.bronze,
            Tier::Silver => self.silver,
            Tier::Gold => self.gold,
        }
    }
}

pub fn validate_thresholds(t: &Thresholds) -> Result<(), ValidationError> {
    if t.bronze < t.silver && t.silver < t.gold {
        Ok(())
    } else {
        Err(ValidationError::new("thresholds_not_increasing"))
    }
}

/// Immutable badge catalog entry.
///
/// Created and edited out-of-band by an administrator; read-only to the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BadgeDefinition {
    /// Catalog ID (document key).
    pub id: u64,
    /// Stable machine-readable code (e.g. "century_rider").
    #[validate(length(min = 1))]
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description shown in the UI.
    #[serde(default)]
    pub description: Option<String>,
    /// Which tier point table applies.
    pub family: BadgeFamily,
    /// Accumulation semantics.
    pub criteria: CriteriaType,
    /// Metric for cumulative/single-activity criteria.
    #[serde(default)]
    pub metric: Option<MetricKind>,
    /// Activity condition for count-style criteria.
    #[serde(default)]
    pub condition: Option<ActivityCondition>,
    /// Only activities of this type contribute, when set.
    #[serde(default)]
    pub activity_type_filter: Option<String>,
    /// Restrict uniqueSports counting to these sports, when set.
    #[serde(default)]
    pub sports_filter: Option<Vec<String>>,
    #[validate(custom(function = "validate_thresholds"))]
    pub thresholds: Thresholds,
    pub reset_period: ResetPeriod,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl BadgeDefinition {
    /// Whether an activity passes the definition's type filter.
    pub fn accepts_activity_type(&self, activity: &Activity) -> bool {
        match &self.activity_type_filter {
            Some(filter) => activity.activity_type == *filter,
            None => true,
        }
    }
}
