// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Awarded badges, one row per (user, badge), independent of period.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::badge::Tier;

/// A badge a user holds.
///
/// `tier` only ever moves forward (bronze → silver → gold) and rows are
/// never deleted: a user cannot lose a badge. Mutated only by the tier
/// awarder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardedBadge {
    pub user_id: u64,
    pub badge_id: u64,
    pub tier: Tier,
    /// Progress value at the time of award or last upgrade.
    pub progress_value: f64,
    /// Cumulative points granted for this badge so far.
    pub points_awarded: i64,
    pub awarded_at: DateTime<Utc>,
    /// Set when the tier was upgraded after the initial award.
    #[serde(default)]
    pub upgraded_at: Option<DateTime<Utc>>,
}
