// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the engine.

pub mod activity;
pub mod award;
pub mod badge;
pub mod progress;

pub use activity::Activity;
pub use award::AwardedBadge;
pub use badge::{
    ActivityCondition, BadgeDefinition, BadgeFamily, CriteriaType, MetricKind, ResetPeriod,
    Thresholds, Tier,
};
pub use progress::{BadgeProgress, ProgressMetadata};
