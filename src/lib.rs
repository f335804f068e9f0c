// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stride-Badges: achievement engine for the fitness competition platform.
//!
//! This crate turns a stream of normalized exercise activities into badge
//! progress, tier awards, and bonus points, and runs the batch detector
//! that finds group workouts (same place, same time, distinct users).
//! Ingestion and scheduling live in the surrounding platform; this library
//! is handed activities and store implementations.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use services::{BadgeCatalog, BadgeEngine, GroupActivityDetector, TierAwarder};
