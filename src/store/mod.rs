// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: async trait seams over the persistence collaborator.
//!
//! The engine never talks to a database directly; the platform wires in
//! implementations of these traits. [`memory::MemoryStore`] is the
//! in-process implementation used by tests and by deployments that keep the
//! working set in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Activity, AwardedBadge, BadgeProgress};

pub mod memory;

pub use memory::MemoryStore;

/// Key identifying one progress row.
///
/// `period_start` is `None` for non-periodic badges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub user_id: u64,
    pub badge_id: u64,
    pub period_start: Option<DateTime<Utc>>,
}

/// Badge progress rows, keyed by (user, badge, period).
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get_progress(
        &self,
        user_id: u64,
        badge_id: u64,
        period_start: Option<DateTime<Utc>>,
    ) -> Result<Option<BadgeProgress>>;

    async fn upsert_progress(&self, progress: &BadgeProgress) -> Result<()>;
}

/// Awarded badges and the per-user point balance.
#[async_trait]
pub trait AwardStore: Send + Sync {
    async fn get_award(&self, user_id: u64, badge_id: u64) -> Result<Option<AwardedBadge>>;

    /// Insert or update the (user, badge) award row.
    async fn put_award(&self, award: &AwardedBadge) -> Result<()>;

    /// Add `delta` to the user's cumulative badge-point score.
    ///
    /// Implementations must make this an atomic increment, not a
    /// read-modify-write in the caller.
    async fn increment_user_badge_points(&self, user_id: u64, delta: i64) -> Result<()>;

    async fn user_badge_points(&self, user_id: u64) -> Result<i64>;
}

/// Read interface over already-ingested activities.
///
/// Both queries exclude soft-deleted records.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Full history for a user, ascending by start time.
    async fn activities_for_user(&self, user_id: u64) -> Result<Vec<Activity>>;

    /// All users' activities with `from <= start_time <= to`, ascending by
    /// start time.
    async fn activities_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>>;
}
