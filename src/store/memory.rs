// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by `DashMap`.
//!
//! Point increments and row upserts go through `DashMap` entry operations,
//! so each key mutates atomically without caller-side read-modify-write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::Result;
use crate::models::{Activity, AwardedBadge, BadgeProgress};
use crate::store::{ActivityRepository, AwardStore, ProgressKey, ProgressStore};

/// In-memory implementation of all three store traits.
#[derive(Default)]
pub struct MemoryStore {
    progress: DashMap<ProgressKey, BadgeProgress>,
    awards: DashMap<(u64, u64), AwardedBadge>,
    points: DashMap<u64, i64>,
    activities: DashMap<u64, Activity>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest an activity (test fixture / in-process deployments).
    pub fn insert_activity(&self, activity: Activity) {
        self.activities.insert(activity.activity_id, activity);
    }

    /// Soft-delete an activity; it disappears from repository queries.
    pub fn soft_delete_activity(&self, activity_id: u64) {
        if let Some(mut entry) = self.activities.get_mut(&activity_id) {
            entry.deleted = true;
        }
    }

    /// Number of award rows held, across all users.
    pub fn award_count(&self) -> usize {
        self.awards.len()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_progress(
        &self,
        user_id: u64,
        badge_id: u64,
        period_start: Option<DateTime<Utc>>,
    ) -> Result<Option<BadgeProgress>> {
        let key = ProgressKey {
            user_id,
            badge_id,
            period_start,
        };
        Ok(self.progress.get(&key).map(|row| row.clone()))
    }

    async fn upsert_progress(&self, progress: &BadgeProgress) -> Result<()> {
        let key = ProgressKey {
            user_id: progress.user_id,
            badge_id: progress.badge_id,
            period_start: progress.period_start,
        };
        self.progress.insert(key, progress.clone());
        Ok(())
    }
}

#[async_trait]
impl AwardStore for MemoryStore {
    async fn get_award(&self, user_id: u64, badge_id: u64) -> Result<Option<AwardedBadge>> {
        Ok(self
            .awards
            .get(&(user_id, badge_id))
            .map(|row| row.clone()))
    }

    async fn put_award(&self, award: &AwardedBadge) -> Result<()> {
        self.awards
            .insert((award.user_id, award.badge_id), award.clone());
        Ok(())
    }

    async fn increment_user_badge_points(&self, user_id: u64, delta: i64) -> Result<()> {
        *self.points.entry(user_id).or_insert(0) += delta;
        Ok(())
    }

    async fn user_badge_points(&self, user_id: u64) -> Result<i64> {
        Ok(self.points.get(&user_id).map(|p| *p).unwrap_or(0))
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn activities_for_user(&self, user_id: u64) -> Result<Vec<Activity>> {
        let mut rows: Vec<Activity> = self
            .activities
            .iter()
            .filter(|entry| entry.user_id == user_id && !entry.deleted)
            .map(|entry| entry.clone())
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }

    async fn activities_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let mut rows: Vec<Activity> = self
            .activities
            .iter()
            .filter(|entry| {
                !entry.deleted && entry.start_time >= from && entry.start_time <= to
            })
            .map(|entry| entry.clone())
            .collect();
        rows.sort_by_key(|a| a.start_time);
        Ok(rows)
    }
}
