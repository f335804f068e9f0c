// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Criteria evaluation: one pure function per criteria type.
//!
//! Each evaluator takes (progress, activity, optional history) and produces
//! the updated accumulated value on the progress row. No I/O happens here;
//! the engine owns store reads/writes and award decisions.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::models::badge::{BadgeDefinition, CriteriaType, MetricKind};
use crate::models::{Activity, BadgeProgress};
use crate::time_utils::{period_key, week_start_utc};

/// Whether this criteria type scans the user's full activity history
/// instead of just the triggering activity.
pub fn needs_history(criteria: CriteriaType) -> bool {
    matches!(
        criteria,
        CriteriaType::WeeklyStreak | CriteriaType::UniqueSports
    )
}

/// Apply one activity to a progress row according to the badge's criteria.
///
/// `history` must be provided for the history-scanning criteria types; it
/// does not need to include the triggering activity (evaluation may run
/// before the activity is persisted).
pub fn evaluate(
    def: &BadgeDefinition,
    progress: &mut BadgeProgress,
    activity: &Activity,
    history: Option<&[Activity]>,
) -> Result<(), EvaluatorError> {
    match def.criteria {
        CriteriaType::Count => {
            let condition = def
                .condition
                .as_ref()
                .ok_or(EvaluatorError::MissingCondition)?;
            if def.accepts_activity_type(activity) && condition.holds(activity) {
                progress.current_value += 1.0;
            }
        }
        CriteriaType::Cumulative | CriteriaType::WeeklyCumulative => {
            let metric = def.metric.ok_or(EvaluatorError::MissingMetric)?;
            if def.accepts_activity_type(activity) {
                // A missing optional metric (calories, suffer score) simply
                // contributes nothing.
                if let Some(value) = metric_value(metric, activity) {
                    progress.current_value += value;
                }
            }
        }
        CriteriaType::SingleActivity => {
            let metric = def.metric.ok_or(EvaluatorError::MissingMetric)?;
            if def.accepts_activity_type(activity) {
                if let Some(value) = metric_value(metric, activity) {
                    progress.current_value = progress.current_value.max(value);
                }
            }
        }
        CriteriaType::WeeklyStreak => {
            let history = history.ok_or(EvaluatorError::MissingHistory)?;
            progress.current_value =
                f64::from(current_weekly_streak(history, activity.start_time));
        }
        CriteriaType::UniqueSports => {
            let history = history.ok_or(EvaluatorError::MissingHistory)?;
            let sports = unique_sports(def, history, activity);
            progress.current_value = sports.len() as f64;
            progress.metadata.sports_seen = sports;
        }
        CriteriaType::WeeklyCount => {
            let condition = def
                .condition
                .as_ref()
                .ok_or(EvaluatorError::MissingCondition)?;
            if def.accepts_activity_type(activity) && condition.holds(activity) {
                let key = period_key(activity.start_time);
                // Each week counts once, no matter how many qualifying
                // activities it had.
                if progress.metadata.counted_periods.insert(key) {
                    progress.current_value += 1.0;
                }
            }
        }
        CriteriaType::GroupActivity => return Err(EvaluatorError::DetectorOnly),
    }

    progress.last_activity_id = Some(activity.activity_id);
    Ok(())
}

/// Extract the metric value from one activity.
///
/// Returns `None` when the provider didn't report the underlying field or
/// the value is undefined (e.g. calories/hour of a zero-duration activity).
fn metric_value(metric: MetricKind, activity: &Activity) -> Option<f64> {
    match metric {
        MetricKind::DistanceKm => Some(activity.distance_meters / 1000.0),
        MetricKind::DistanceMiles => Some(activity.distance_meters / 1609.344),
        MetricKind::ElevationGain => Some(activity.elevation_gain_meters),
        MetricKind::MovingTimeHours => Some(activity.moving_time_hours()),
        MetricKind::SufferScore => activity.suffer_score,
        MetricKind::CaloriesPerHour => {
            let hours = activity.moving_time_hours();
            if hours > 0.0 {
                activity.calories.map(|c| c / hours)
            } else {
                None
            }
        }
        MetricKind::AverageSpeedKmh => Some(activity.average_speed_mps * 3.6),
    }
}

/// Longest run of consecutive active weeks ending at the most recent one.
///
/// A week is active when it has at least one activity. Consecutive means
/// week starts exactly 7 days apart (UTC Monday boundaries); any gap ends
/// the run. The triggering activity's week is always counted as active.
fn current_weekly_streak(history: &[Activity], triggering_start: DateTime<Utc>) -> u32 {
    let mut active_weeks: BTreeSet<DateTime<Utc>> = history
        .iter()
        .map(|a| week_start_utc(a.start_time))
        .collect();
    active_weeks.insert(week_start_utc(triggering_start));

    let Some(&latest) = active_weeks.iter().next_back() else {
        return 0;
    };

    let mut streak = 1;
    let mut cursor = latest;
    while active_weeks.contains(&(cursor - Duration::days(7))) {
        cursor -= Duration::days(7);
        streak += 1;
    }
    streak
}

/// Distinct sport types across history plus the triggering activity,
/// restricted to the definition's sport list when present.
fn unique_sports(
    def: &BadgeDefinition,
    history: &[Activity],
    activity: &Activity,
) -> BTreeSet<String> {
    let allowed = |sport: &str| match &def.sports_filter {
        Some(filter) => filter.iter().any(|s| s == sport),
        None => true,
    };

    history
        .iter()
        .map(|a| a.sport_type.as_str())
        .chain(std::iter::once(activity.sport_type.as_str()))
        .filter(|sport| allowed(sport))
        .map(String::from)
        .collect()
}

/// Errors from criteria evaluation. Each is isolated to its badge by the
/// engine loop.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("criteria requires a metric but the definition has none")]
    MissingMetric,

    #[error("criteria requires a condition but the definition has none")]
    MissingCondition,

    #[error("criteria requires activity history but none was provided")]
    MissingHistory,

    #[error("groupActivity badges are awarded by the detector, not per activity")]
    DetectorOnly,
}
