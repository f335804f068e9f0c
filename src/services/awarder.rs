// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tier awarding: monotonic upgrades and delta-only point bookkeeping.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::badge::{BadgeDefinition, Tier};
use crate::models::AwardedBadge;
use crate::store::AwardStore;

/// A tier transition the awarder applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTransition {
    pub tier: Tier,
    pub previous_tier: Option<Tier>,
    /// Points credited to the user for this transition (the increment, not
    /// the new total).
    pub points_delta: i64,
}

/// Applies tier transitions against the award store.
///
/// Invariants enforced here:
/// - tier only moves forward (bronze → silver → gold), never backward;
/// - the user's score receives only the positive point delta, so replaying
///   the same transition is a no-op.
#[derive(Clone)]
pub struct TierAwarder {
    awards: Arc<dyn AwardStore>,
    config: EngineConfig,
}

impl TierAwarder {
    pub fn new(awards: Arc<dyn AwardStore>, config: EngineConfig) -> Self {
        Self { awards, config }
    }

    /// Award or upgrade the badge if `current_value` newly reaches a tier.
    ///
    /// Returns the applied transition, or `None` when nothing changed
    /// (value below bronze, or tier already at or above what the value
    /// reaches).
    pub async fn apply(
        &self,
        def: &BadgeDefinition,
        user_id: u64,
        current_value: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<TierTransition>> {
        let existing = self.awards.get_award(user_id, def.id).await?;
        let existing_tier = existing.as_ref().map(|a| a.tier);

        // Highest tier the value reaches that the user doesn't already hold.
        let target = Tier::DESCENDING.into_iter().find(|t| {
            current_value >= def.thresholds.value_for(*t)
                && existing_tier.map_or(true, |held| held < *t)
        });

        let Some(tier) = target else {
            tracing::debug!(
                user_id,
                badge = %def.code,
                current_value,
                "No new tier reached (idempotent skip)"
            );
            return Ok(None);
        };

        let new_points = self.config.tier_points(def.family).value_for(tier);
        let (previous_points, award) = match existing {
            Some(mut award) => {
                let previous_points = award.points_awarded;
                award.tier = tier;
                award.progress_value = current_value;
                award.points_awarded = new_points;
                award.upgraded_at = Some(now);
                (previous_points, award)
            }
            None => (
                0,
                AwardedBadge {
                    user_id,
                    badge_id: def.id,
                    tier,
                    progress_value: current_value,
                    points_awarded: new_points,
                    awarded_at: now,
                    upgraded_at: None,
                },
            ),
        };

        let points_delta = new_points - previous_points;

        self.awards.put_award(&award).await?;
        if points_delta > 0 {
            self.awards
                .increment_user_badge_points(user_id, points_delta)
                .await?;
        }

        tracing::info!(
            user_id,
            badge = %def.code,
            tier = %tier,
            points_delta,
            "Badge tier awarded"
        );

        Ok(Some(TierTransition {
            tier,
            previous_tier: existing_tier,
            points_delta,
        }))
    }
}
