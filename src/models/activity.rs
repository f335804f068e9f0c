// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized activity record, as handed to the engine by ingestion.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One normalized exercise record.
///
/// Read-only to the engine; produced by the ingestion collaborator from the
/// provider's raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Provider activity ID (also the document ID).
    pub activity_id: u64,
    /// Owning user ID.
    pub user_id: u64,
    /// Activity name/title.
    pub name: String,
    /// Activity type (Ride, Run, Hike, ...).
    pub activity_type: String,
    /// Sport type, more specific than activity type (e.g. MountainBikeRide).
    pub sport_type: String,
    /// Start instant, UTC. Drives period resolution and clustering.
    pub start_time: DateTime<Utc>,
    /// Start time on the athlete's wall clock. Drives hour-of-day
    /// conditions only.
    pub start_time_local: NaiveDateTime,
    /// Distance in meters.
    pub distance_meters: f64,
    /// Moving time in seconds.
    pub moving_time_seconds: u32,
    /// Elapsed time in seconds (moving time plus stops).
    pub elapsed_time_seconds: u32,
    /// Total elevation gain in meters.
    pub elevation_gain_meters: f64,
    /// Average speed in meters per second.
    pub average_speed_mps: f64,
    /// Calories burned, when the provider reports them.
    #[serde(default)]
    pub calories: Option<f64>,
    /// Provider effort score, when reported.
    #[serde(default)]
    pub suffer_score: Option<f64>,
    /// Number of photos attached.
    #[serde(default)]
    pub photo_count: u32,
    /// Encoded summary polyline (precision 5), when GPS was recorded.
    #[serde(default)]
    pub polyline: Option<String>,
    /// Soft-delete flag; deleted activities are excluded from queries.
    #[serde(default)]
    pub deleted: bool,
}

impl Activity {
    /// Hour of day (0-23) on the athlete's wall clock.
    pub fn local_start_hour(&self) -> u32 {
        self.start_time_local.hour()
    }

    /// Moving time in hours.
    pub fn moving_time_hours(&self) -> f64 {
        f64::from(self.moving_time_seconds) / 3600.0
    }
}
