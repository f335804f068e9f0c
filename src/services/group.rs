// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group activity detection.
//!
//! A batch job that scans a lookback window, decodes one representative
//! start coordinate per activity, clusters activities by start-time and
//! start-point proximity (single-linkage: joining through any existing
//! member), and awards a size-tiered group badge to every cluster member.
//! Stateless between runs; re-running over an overlapping window converges
//! to no-ops through the awarder's tier monotonicity.

use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt};
use geo_types::Point;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::GroupDetectorConfig;
use crate::error::Result;
use crate::models::badge::BadgeDefinition;
use crate::models::Activity;
use crate::services::awarder::TierAwarder;
use crate::services::catalog::BadgeCatalog;
use crate::store::ActivityRepository;

/// Earth radius in meters for great-circle distance.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Concurrent award writes per cluster.
const MAX_CONCURRENT_AWARD_WRITES: usize = 16;

/// One activity eligible for clustering, with its decoded start point.
#[derive(Debug, Clone)]
struct Candidate {
    activity_id: u64,
    user_id: u64,
    start_time: DateTime<Utc>,
    start: Point<f64>,
}

/// Summary of one detector run, for the scheduler's logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetectionReport {
    /// Activities in the window meeting the duration floor.
    pub scanned: usize,
    /// Excluded for missing/undecodable polyline.
    pub skipped_no_route: usize,
    /// Clusters with at least two members.
    pub clusters: usize,
    /// Tier transitions actually applied (re-runs report 0 here).
    pub awards_applied: usize,
}

/// Batch detector for group workouts.
pub struct GroupActivityDetector {
    activities: Arc<dyn ActivityRepository>,
    catalog: Arc<BadgeCatalog>,
    awarder: TierAwarder,
    config: GroupDetectorConfig,
}

impl GroupActivityDetector {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        catalog: Arc<BadgeCatalog>,
        awarder: TierAwarder,
        config: GroupDetectorConfig,
    ) -> Self {
        Self {
            activities,
            catalog,
            awarder,
            config,
        }
    }

    /// Run one detection pass over the lookback window ending at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<DetectionReport> {
        let from = now - Duration::hours(self.config.lookback_hours);
        tracing::info!(
            from = %from,
            to = %now,
            "Starting group activity detection"
        );

        let group_defs: Vec<&BadgeDefinition> = self.catalog.group_definitions().collect();
        if group_defs.is_empty() {
            tracing::warn!("No active group badge in catalog; nothing to award");
            return Ok(DetectionReport::default());
        }

        let window = self.activities.activities_between(from, now).await?;
        let mut report = DetectionReport::default();
        let mut candidates = Vec::new();

        for activity in window
            .iter()
            .filter(|a| a.elapsed_time_seconds >= self.config.min_elapsed_seconds)
        {
            report.scanned += 1;
            match start_point(activity) {
                Some(start) => candidates.push(Candidate {
                    activity_id: activity.activity_id,
                    user_id: activity.user_id,
                    start_time: activity.start_time,
                    start,
                }),
                None => report.skipped_no_route += 1,
            }
        }

        let clusters = build_clusters(&candidates, &self.config);

        for cluster in clusters.iter().filter(|c| c.len() >= 2) {
            report.clusters += 1;
            let size = cluster.len();
            tracing::info!(
                size,
                activity_ids = ?cluster.iter().map(|c| c.activity_id).collect::<Vec<_>>(),
                "Detected group activity cluster"
            );

            for def in &group_defs {
                report.awards_applied += self.award_cluster(def, cluster, size, now).await;
            }
        }

        tracing::info!(
            scanned = report.scanned,
            skipped_no_route = report.skipped_no_route,
            clusters = report.clusters,
            awards_applied = report.awards_applied,
            "Group activity detection finished"
        );
        Ok(report)
    }

    /// Award every cluster member, with bounded write concurrency.
    ///
    /// One member's store failure is logged and does not block the others.
    async fn award_cluster(
        &self,
        def: &BadgeDefinition,
        cluster: &[Candidate],
        size: usize,
        now: DateTime<Utc>,
    ) -> usize {
        let results: Vec<_> = stream::iter(cluster)
            .map(|member| {
                let awarder = &self.awarder;
                async move {
                    let result = awarder.apply(def, member.user_id, size as f64, now).await;
                    (member.user_id, result)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_AWARD_WRITES)
            .collect()
            .await;

        let mut applied = 0;
        for (user_id, result) in results {
            match result {
                Ok(Some(_)) => applied += 1,
                Ok(None) => {
                    tracing::debug!(user_id, badge = %def.code, "Already at tier (idempotent skip)");
                }
                Err(e) => {
                    tracing::error!(
                        user_id,
                        badge = %def.code,
                        error = %e,
                        "Failed to apply group badge award"
                    );
                }
            }
        }
        applied
    }
}

/// Decode the representative start coordinate of an activity.
///
/// Activities without a decodable polyline are excluded from clustering;
/// that is a normal condition (manual entries, trainer rides), not an error.
fn start_point(activity: &Activity) -> Option<Point<f64>> {
    let encoded = activity.polyline.as_deref()?;
    match polyline::decode_polyline(encoded, 5) {
        Ok(line) => {
            let first = line.points().next();
            if first.is_none() {
                tracing::debug!(
                    activity_id = activity.activity_id,
                    "Polyline decoded to an empty path; excluding from clustering"
                );
            }
            first
        }
        Err(e) => {
            tracing::debug!(
                activity_id = activity.activity_id,
                error = %e,
                "Undecodable polyline; excluding from clustering"
            );
            None
        }
    }
}

/// Single-linkage clustering over start time and start point.
///
/// A candidate joins a cluster when its user is not yet represented and it
/// is within the time and distance windows of any current member; passes
/// repeat until no candidate can join. Each candidate lands in exactly one
/// cluster.
fn build_clusters(candidates: &[Candidate], config: &GroupDetectorConfig) -> Vec<Vec<Candidate>> {
    let mut assigned = vec![false; candidates.len()];
    let mut clusters = Vec::new();

    for seed in 0..candidates.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![candidates[seed].clone()];
        let mut users: HashSet<u64> = HashSet::from([candidates[seed].user_id]);

        loop {
            let mut added = false;
            for (i, candidate) in candidates.iter().enumerate() {
                if assigned[i] || users.contains(&candidate.user_id) {
                    continue;
                }
                if members.iter().any(|m| within_windows(m, candidate, config)) {
                    assigned[i] = true;
                    users.insert(candidate.user_id);
                    members.push(candidate.clone());
                    added = true;
                }
            }
            if !added {
                break;
            }
        }

        clusters.push(members);
    }

    clusters
}

fn within_windows(a: &Candidate, b: &Candidate, config: &GroupDetectorConfig) -> bool {
    let seconds_apart = (a.start_time - b.start_time).num_seconds().abs();
    seconds_apart <= config.time_window_seconds
        && haversine_distance_m(a.start, b.start) <= config.distance_window_meters
}

/// Great-circle distance in meters between two points ((x, y) = (lng, lat)).
fn haversine_distance_m(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let dlat = (b.y() - a.y()).to_radians();
    let dlng = (b.x() - a.x()).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
