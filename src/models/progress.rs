// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-(user, badge, period) progress rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::badge::Tier;

/// Evaluator bookkeeping attached to a progress row.
///
/// Which fields are populated depends on the criteria type: uniqueSports
/// stores the sports seen, weeklyCount stores the period keys already
/// counted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressMetadata {
    /// Distinct sport types recorded so far (uniqueSports).
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub sports_seen: BTreeSet<String>,
    /// Week keys already counted (weeklyCount); prevents double-counting a
    /// week on re-processing.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub counted_periods: BTreeSet<String>,
}

/// One progress row per (user, badge, period).
///
/// Non-periodic badges use `period_start = None`. Weekly badges get a fresh
/// row each week; prior rows are retained as history, never reset in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeProgress {
    pub user_id: u64,
    pub badge_id: u64,
    /// Running accumulated metric value.
    pub current_value: f64,
    /// Monotonic within a row: once true, never reset to false.
    pub bronze_achieved: bool,
    pub silver_achieved: bool,
    pub gold_achieved: bool,
    /// Last activity that touched this row.
    pub last_activity_id: Option<u64>,
    #[serde(default)]
    pub metadata: ProgressMetadata,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl BadgeProgress {
    /// Fresh row created on the first relevant activity for this key.
    pub fn new(
        user_id: u64,
        badge_id: u64,
        period: Option<(DateTime<Utc>, DateTime<Utc>)>,
        now: DateTime<Utc>,
    ) -> Self {
        let (period_start, period_end) = match period {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };
        Self {
            user_id,
            badge_id,
            current_value: 0.0,
            bronze_achieved: false,
            silver_achieved: false,
            gold_achieved: false,
            last_activity_id: None,
            metadata: ProgressMetadata::default(),
            period_start,
            period_end,
            updated_at: now,
        }
    }

    /// Highest tier this row has reached, if any.
    pub fn achieved_tier(&self) -> Option<Tier> {
        if self.gold_achieved {
            Some(Tier::Gold)
        } else if self.silver_achieved {
            Some(Tier::Silver)
        } else if self.bronze_achieved {
            Some(Tier::Bronze)
        } else {
            None
        }
    }

    /// Record that `tier` was reached. Thresholds are strictly increasing,
    /// so reaching a tier implies every lower one.
    pub fn mark_achieved(&mut self, tier: Tier) {
        self.bronze_achieved = true;
        if tier >= Tier::Silver {
            self.silver_achieved = true;
        }
        if tier >= Tier::Gold {
            self.gold_achieved = true;
        }
    }
}
