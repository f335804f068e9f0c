// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use std::sync::Arc;
use stride_badges::config::EngineConfig;
use stride_badges::models::Activity;
use stride_badges::services::BadgeCatalog;
use stride_badges::store::MemoryStore;
use stride_badges::BadgeEngine;

/// Initialize test logging once (RUST_LOG controls verbosity).
#[allow(dead_code)]
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Build an activity with sensible defaults; tests override what they need.
#[allow(dead_code)]
pub fn base_activity(id: u64, user_id: u64, start: DateTime<Utc>) -> Activity {
    Activity {
        activity_id: id,
        user_id,
        name: format!("Activity {}", id),
        activity_type: "Ride".to_string(),
        sport_type: "Ride".to_string(),
        start_time: start,
        start_time_local: start.naive_utc(),
        distance_meters: 10_000.0,
        moving_time_seconds: 3600,
        elapsed_time_seconds: 3700,
        elevation_gain_meters: 150.0,
        average_speed_mps: 6.5,
        calories: Some(600.0),
        suffer_score: Some(45.0),
        photo_count: 0,
        polyline: None,
        deleted: false,
    }
}

/// Encode a two-point polyline starting at (lat, lng).
#[allow(dead_code)]
pub fn encoded_start(lat: f64, lng: f64) -> String {
    let coords = vec![
        geo_types::coord! { x: lng, y: lat },
        geo_types::coord! { x: lng + 0.001, y: lat + 0.001 },
    ];
    polyline::encode_coordinates(coords, 5).expect("Failed to encode test polyline")
}

/// Engine wired to one shared in-memory store.
#[allow(dead_code)]
pub fn test_engine(catalog: BadgeCatalog, store: Arc<MemoryStore>) -> BadgeEngine {
    BadgeEngine::new(
        Arc::new(catalog),
        store.clone(),
        store.clone(),
        store,
        EngineConfig::default(),
    )
}

/// Catalog with one lifetime cumulative-distance badge (km, 100/300/600).
#[allow(dead_code)]
pub fn distance_catalog() -> BadgeCatalog {
    BadgeCatalog::load_from_json(
        r#"[{
            "id": 1,
            "code": "century_club",
            "name": "Century Club",
            "family": "standard",
            "criteria": "cumulative",
            "metric": "distance_km",
            "thresholds": {"bronze": 100.0, "silver": 300.0, "gold": 600.0},
            "reset_period": "none"
        }]"#,
    )
    .expect("distance catalog should load")
}

/// Catalog with one group badge (size thresholds 2/3/6).
#[allow(dead_code)]
pub fn group_catalog() -> BadgeCatalog {
    BadgeCatalog::load_from_json(
        r#"[{
            "id": 20,
            "code": "squad_session",
            "name": "Squad Session",
            "family": "group",
            "criteria": "groupActivity",
            "thresholds": {"bronze": 2.0, "silver": 3.0, "gold": 6.0},
            "reset_period": "none"
        }]"#,
    )
    .expect("group catalog should load")
}
