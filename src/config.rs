// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Engine configuration loaded from environment variables.
//!
//! Every setting has a production default, so `from_env` never fails; a
//! deployment overrides only what it needs.

use std::env;

use crate::models::badge::{BadgeFamily, Tier};

/// Points granted per tier for one badge family.
///
/// The values must be internally consistent within a badge: an upgrade pays
/// out `points[new] - points[old]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPoints {
    pub bronze: i64,
    pub silver: i64,
    pub gold: i64,
}

impl TierPoints {
    pub fn value_for(&self, tier: Tier) -> i64 {
        match tier {
            Tier::Bronze => self.bronze,
            Tier::Silver => self.silver,
            Tier::Gold => self.gold,
        }
    }
}

/// Tunables for the group activity detector.
#[derive(Debug, Clone, Copy)]
pub struct GroupDetectorConfig {
    /// How far back one detector run scans.
    pub lookback_hours: i64,
    /// Maximum start-time difference between cluster members.
    pub time_window_seconds: i64,
    /// Maximum start-point distance between cluster members.
    pub distance_window_meters: f64,
    /// Activities shorter than this (elapsed) never cluster.
    pub min_elapsed_seconds: u32,
}

impl Default for GroupDetectorConfig {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            time_window_seconds: 5 * 60,
            distance_window_meters: 150.0,
            min_elapsed_seconds: 15 * 60,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tier points for standard badges.
    pub standard_tier_points: TierPoints,
    /// Tier points for group-workout badges.
    pub group_tier_points: TierPoints,
    pub detector: GroupDetectorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_tier_points: TierPoints {
                bronze: 3,
                silver: 6,
                gold: 10,
            },
            group_tier_points: TierPoints {
                bronze: 3,
                silver: 6,
                gold: 15,
            },
            detector: GroupDetectorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, with defaults for
    /// everything that is unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        Self {
            standard_tier_points: tier_points_var(
                "BADGE_TIER_POINTS_STANDARD",
                defaults.standard_tier_points,
            ),
            group_tier_points: tier_points_var(
                "BADGE_TIER_POINTS_GROUP",
                defaults.group_tier_points,
            ),
            detector: GroupDetectorConfig {
                lookback_hours: numeric_var(
                    "GROUP_DETECTOR_LOOKBACK_HOURS",
                    defaults.detector.lookback_hours,
                ),
                time_window_seconds: numeric_var(
                    "GROUP_DETECTOR_TIME_WINDOW_SECONDS",
                    defaults.detector.time_window_seconds,
                ),
                distance_window_meters: numeric_var(
                    "GROUP_DETECTOR_DISTANCE_WINDOW_METERS",
                    defaults.detector.distance_window_meters,
                ),
                min_elapsed_seconds: numeric_var(
                    "GROUP_DETECTOR_MIN_ELAPSED_SECONDS",
                    defaults.detector.min_elapsed_seconds,
                ),
            },
        }
    }

    /// The tier point table for a badge family.
    pub fn tier_points(&self, family: BadgeFamily) -> TierPoints {
        match family {
            BadgeFamily::Standard => self.standard_tier_points,
            BadgeFamily::Group => self.group_tier_points,
        }
    }
}

fn numeric_var<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a "bronze,silver,gold" triple, e.g. "3,6,15".
fn tier_points_var(name: &str, default: TierPoints) -> TierPoints {
    let Ok(raw) = env::var(name) else {
        return default;
    };
    let parts: Vec<i64> = raw
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    match parts.as_slice() {
        [bronze, silver, gold] => TierPoints {
            bronze: *bronze,
            silver: *silver,
            gold: *gold,
        },
        _ => {
            tracing::warn!(var = name, value = %raw, "Ignoring malformed tier point triple");
            default
        }
    }
}
