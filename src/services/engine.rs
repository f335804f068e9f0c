// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activity badge evaluation pipeline.
//!
//! For every active badge definition: resolve the reset period, read (or
//! create) the progress row, evaluate the criteria, apply any tier award,
//! and write the row back. Concurrent ingestion paths (live webhook plus
//! backfill sync) may evaluate activities for the same user at the same
//! time, so each (user, badge, period) key is serialized behind its own
//! async mutex for the read-evaluate-write span.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::models::badge::{BadgeDefinition, CriteriaType, Tier};
use crate::models::{Activity, BadgeProgress};
use crate::services::awarder::{TierAwarder, TierTransition};
use crate::services::catalog::BadgeCatalog;
use crate::services::evaluator;
use crate::store::{ActivityRepository, AwardStore, ProgressKey, ProgressStore};

/// Per-key mutexes serializing progress evaluation.
///
/// Shared across all engine instances in the process, like the teacher
/// ingestion path shares one map per instance.
pub type EvalLocks = Arc<DashMap<ProgressKey, Arc<Mutex<()>>>>;

/// Result of evaluating one badge for one activity.
#[derive(Debug, Clone)]
pub struct BadgeOutcome {
    pub badge_id: u64,
    pub code: String,
    pub current_value: f64,
    pub transition: Option<TierTransition>,
}

/// The badge evaluation engine.
#[derive(Clone)]
pub struct BadgeEngine {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<dyn ProgressStore>,
    activities: Arc<dyn ActivityRepository>,
    awarder: TierAwarder,
    eval_locks: EvalLocks,
}

impl BadgeEngine {
    pub fn new(
        catalog: Arc<BadgeCatalog>,
        progress: Arc<dyn ProgressStore>,
        awards: Arc<dyn AwardStore>,
        activities: Arc<dyn ActivityRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            progress,
            activities,
            awarder: TierAwarder::new(awards, config),
            eval_locks: Arc::new(DashMap::new()),
        }
    }

    /// The awarder this engine applies transitions through (shared with the
    /// group detector so both honor the same point tables).
    pub fn awarder(&self) -> &TierAwarder {
        &self.awarder
    }

    /// Evaluate one incoming activity against every active badge.
    ///
    /// A failure for one badge definition is logged and does not abort the
    /// others; the returned outcomes cover the definitions that evaluated
    /// successfully.
    pub async fn process_activity(&self, activity: &Activity) -> Vec<BadgeOutcome> {
        if activity.deleted {
            tracing::debug!(
                activity_id = activity.activity_id,
                "Skipping soft-deleted activity"
            );
            return Vec::new();
        }

        tracing::info!(
            user_id = activity.user_id,
            activity_id = activity.activity_id,
            sport = %activity.sport_type,
            "Evaluating activity against badge catalog"
        );

        let mut history: Option<Vec<Activity>> = None;
        let mut outcomes = Vec::new();

        for def in self.catalog.active() {
            // Group badges are awarded by the batch detector.
            if def.criteria == CriteriaType::GroupActivity {
                continue;
            }

            let history_slice = if evaluator::needs_history(def.criteria) {
                if history.is_none() {
                    match self.activities.activities_for_user(activity.user_id).await {
                        Ok(rows) => history = Some(rows),
                        Err(e) => {
                            tracing::error!(
                                badge = %def.code,
                                error = %e,
                                "Failed to fetch activity history"
                            );
                            continue;
                        }
                    }
                }
                history.as_deref()
            } else {
                None
            };

            match self.evaluate_badge(def, activity, history_slice).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(
                        user_id = activity.user_id,
                        activity_id = activity.activity_id,
                        badge = %def.code,
                        error = %e,
                        "Badge evaluation failed"
                    );
                }
            }
        }

        outcomes
    }

    /// Evaluate one definition under its (user, badge, period) lock.
    async fn evaluate_badge(
        &self,
        def: &BadgeDefinition,
        activity: &Activity,
        history: Option<&[Activity]>,
    ) -> Result<BadgeOutcome> {
        let now = Utc::now();
        let period = crate::time_utils::resolve_period(activity.start_time, def.reset_period);
        let key = ProgressKey {
            user_id: activity.user_id,
            badge_id: def.id,
            period_start: period.map(|(start, _)| start),
        };

        let lock = self
            .eval_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let mut progress = self
            .progress
            .get_progress(key.user_id, key.badge_id, key.period_start)
            .await?
            .unwrap_or_else(|| {
                BadgeProgress::new(activity.user_id, def.id, period, now)
            });

        evaluator::evaluate(def, &mut progress, activity, history)
            .map_err(|e| EngineError::Evaluator(e.to_string()))?;
        progress.updated_at = now;

        let transition = self
            .awarder
            .apply(def, activity.user_id, progress.current_value, now)
            .await?;

        // Row-local achievement flags reflect the thresholds this row's
        // value has cleared, whether or not the (period-independent) award
        // changed.
        if let Some(tier) = Tier::DESCENDING
            .into_iter()
            .find(|t| progress.current_value >= def.thresholds.value_for(*t))
        {
            progress.mark_achieved(tier);
        }

        self.progress.upsert_progress(&progress).await?;

        Ok(BadgeOutcome {
            badge_id: def.id,
            code: def.code.clone(),
            current_value: progress.current_value,
            transition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badge::{
        ActivityCondition, BadgeFamily, MetricKind, ResetPeriod, Thresholds,
    };
    use crate::store::MemoryStore;
    use chrono::{DateTime, TimeZone};

    fn catalog() -> BadgeCatalog {
        BadgeCatalog::new(vec![
            BadgeDefinition {
                id: 1,
                code: "century_club".to_string(),
                name: "Century Club".to_string(),
                description: None,
                family: BadgeFamily::Standard,
                criteria: CriteriaType::Cumulative,
                metric: Some(MetricKind::DistanceKm),
                condition: None,
                activity_type_filter: None,
                sports_filter: None,
                thresholds: Thresholds {
                    bronze: 100.0,
                    silver: 300.0,
                    gold: 600.0,
                },
                reset_period: ResetPeriod::None,
                is_active: true,
            },
            BadgeDefinition {
                id: 2,
                code: "weekly_hours".to_string(),
                name: "Weekly Hours".to_string(),
                description: None,
                family: BadgeFamily::Standard,
                criteria: CriteriaType::WeeklyCumulative,
                metric: Some(MetricKind::MovingTimeHours),
                condition: None,
                activity_type_filter: None,
                sports_filter: None,
                thresholds: Thresholds {
                    bronze: 3.0,
                    silver: 6.0,
                    gold: 10.0,
                },
                reset_period: ResetPeriod::Weekly,
                is_active: true,
            },
            BadgeDefinition {
                id: 3,
                code: "photo_proof".to_string(),
                name: "Photo Proof".to_string(),
                description: None,
                family: BadgeFamily::Standard,
                criteria: CriteriaType::Count,
                metric: None,
                condition: Some(ActivityCondition::MinPhotoCount { count: 1 }),
                activity_type_filter: None,
                sports_filter: None,
                thresholds: Thresholds {
                    bronze: 1.0,
                    silver: 2.0,
                    gold: 3.0,
                },
                reset_period: ResetPeriod::None,
                is_active: true,
            },
        ])
        .unwrap()
    }

    fn engine(store: Arc<MemoryStore>) -> BadgeEngine {
        BadgeEngine::new(
            Arc::new(catalog()),
            store.clone(),
            store.clone(),
            store,
            EngineConfig::default(),
        )
    }

    fn activity(id: u64, start: DateTime<Utc>, distance_m: f64) -> Activity {
        Activity {
            activity_id: id,
            user_id: 10,
            name: format!("Activity {}", id),
            activity_type: "Ride".to_string(),
            sport_type: "Ride".to_string(),
            start_time: start,
            start_time_local: start.naive_utc(),
            distance_meters: distance_m,
            moving_time_seconds: 3600,
            elapsed_time_seconds: 3700,
            elevation_gain_meters: 200.0,
            average_speed_mps: 7.0,
            calories: None,
            suffer_score: None,
            photo_count: 0,
            polyline: None,
            deleted: false,
        }
    }

    #[tokio::test]
    async fn test_weekly_rows_isolated_per_period() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());

        let week1 = Utc.with_ymd_and_hms(2025, 9, 3, 8, 0, 0).unwrap();
        let week2 = Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap();
        engine.process_activity(&activity(1, week1, 10_000.0)).await;
        engine.process_activity(&activity(2, week2, 10_000.0)).await;

        let start1 = crate::time_utils::week_start_utc(week1);
        let start2 = crate::time_utils::week_start_utc(week2);
        let row1 = store.get_progress(10, 2, Some(start1)).await.unwrap().unwrap();
        let row2 = store.get_progress(10, 2, Some(start2)).await.unwrap().unwrap();

        // One hour each, in separate weekly rows; the prior row is retained.
        assert_eq!(row1.current_value, 1.0);
        assert_eq!(row2.current_value, 1.0);
    }

    #[tokio::test]
    async fn test_soft_deleted_activity_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());

        let start = Utc.with_ymd_and_hms(2025, 9, 3, 8, 0, 0).unwrap();
        let mut a = activity(1, start, 200_000.0);
        a.deleted = true;

        let outcomes = engine.process_activity(&a).await;
        assert!(outcomes.is_empty());
        assert_eq!(store.award_count(), 0);
    }

    #[tokio::test]
    async fn test_group_definitions_skipped_by_pipeline() {
        let store = Arc::new(MemoryStore::new());
        let group_catalog = BadgeCatalog::new(vec![BadgeDefinition {
            id: 9,
            code: "squad_session".to_string(),
            name: "Squad Session".to_string(),
            description: None,
            family: BadgeFamily::Group,
            criteria: CriteriaType::GroupActivity,
            metric: None,
            condition: None,
            activity_type_filter: None,
            sports_filter: None,
            thresholds: Thresholds {
                bronze: 2.0,
                silver: 3.0,
                gold: 6.0,
            },
            reset_period: ResetPeriod::None,
            is_active: true,
        }])
        .unwrap();

        let engine = BadgeEngine::new(
            Arc::new(group_catalog),
            store.clone(),
            store.clone(),
            store.clone(),
            EngineConfig::default(),
        );

        let start = Utc.with_ymd_and_hms(2025, 9, 3, 8, 0, 0).unwrap();
        let outcomes = engine.process_activity(&activity(1, start, 50_000.0)).await;

        assert!(outcomes.is_empty());
        assert_eq!(store.award_count(), 0);
    }
}
