// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge catalog loading and validation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use validator::Validate;

use crate::models::badge::{BadgeDefinition, CriteriaType};

/// Read-only catalog of badge definitions.
///
/// Loaded once at startup from JSON maintained by the admin panel; the
/// engine never mutates it.
#[derive(Default, Clone)]
pub struct BadgeCatalog {
    definitions: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    /// Build a catalog from already-parsed definitions, validating each.
    pub fn new(definitions: Vec<BadgeDefinition>) -> Result<Self, CatalogError> {
        let mut seen_ids = HashSet::new();
        for def in &definitions {
            def.validate()
                .map_err(|e| CatalogError::Invalid(def.code.clone(), e.to_string()))?;
            validate_criteria_inputs(def)?;
            if !seen_ids.insert(def.id) {
                return Err(CatalogError::DuplicateId(def.id));
            }
        }

        tracing::info!(count = definitions.len(), "Loaded badge definitions");
        Ok(Self { definitions })
    }

    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON array of definitions.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<BadgeDefinition> =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;
        Self::new(definitions)
    }

    /// All definitions, active or not.
    pub fn definitions(&self) -> &[BadgeDefinition] {
        &self.definitions
    }

    /// Active definitions, in catalog order.
    pub fn active(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions.iter().filter(|d| d.is_active)
    }

    /// Active group-workout definitions (awarded by the detector).
    pub fn group_definitions(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.active()
            .filter(|d| d.criteria == CriteriaType::GroupActivity)
    }

    pub fn get(&self, badge_id: u64) -> Option<&BadgeDefinition> {
        self.definitions.iter().find(|d| d.id == badge_id)
    }
}

/// Cross-field checks serde cannot express: each criteria type needs its
/// inputs present in the definition.
fn validate_criteria_inputs(def: &BadgeDefinition) -> Result<(), CatalogError> {
    let missing = |what: &str| {
        Err(CatalogError::Invalid(
            def.code.clone(),
            format!("{:?} criteria requires {}", def.criteria, what),
        ))
    };

    match def.criteria {
        CriteriaType::Count | CriteriaType::WeeklyCount if def.condition.is_none() => {
            missing("a condition")
        }
        CriteriaType::Cumulative
        | CriteriaType::WeeklyCumulative
        | CriteriaType::SingleActivity
            if def.metric.is_none() =>
        {
            missing("a metric")
        }
        _ => Ok(()),
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse catalog JSON: {0}")]
    ParseError(String),

    #[error("Invalid badge definition '{0}': {1}")]
    Invalid(String, String),

    #[error("Duplicate badge id: {0}")]
    DuplicateId(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CATALOG: &str = r#"[
        {
            "id": 1,
            "code": "century_club",
            "name": "Century Club",
            "family": "standard",
            "criteria": "cumulative",
            "metric": "distance_km",
            "thresholds": {"bronze": 100.0, "silver": 300.0, "gold": 600.0},
            "reset_period": "none"
        },
        {
            "id": 2,
            "code": "early_bird",
            "name": "Early Bird",
            "family": "standard",
            "criteria": "count",
            "condition": {"type": "startHourBefore", "hour": 7},
            "thresholds": {"bronze": 5.0, "silver": 15.0, "gold": 30.0},
            "reset_period": "none"
        },
        {
            "id": 3,
            "code": "squad_session",
            "name": "Squad Session",
            "family": "group",
            "criteria": "groupActivity",
            "thresholds": {"bronze": 2.0, "silver": 3.0, "gold": 6.0},
            "reset_period": "none"
        }
    ]"#;

    #[test]
    fn test_load_sample_catalog() {
        let catalog = BadgeCatalog::load_from_json(SAMPLE_CATALOG).expect("catalog should load");
        assert_eq!(catalog.definitions().len(), 3);
        assert_eq!(catalog.active().count(), 3);
        assert_eq!(catalog.group_definitions().count(), 1);
        assert_eq!(catalog.get(2).map(|d| d.code.as_str()), Some("early_bird"));
    }

    #[test]
    fn test_rejects_non_increasing_thresholds() {
        let json = r#"[{
            "id": 1,
            "code": "bad",
            "name": "Bad",
            "family": "standard",
            "criteria": "cumulative",
            "metric": "distance_km",
            "thresholds": {"bronze": 100.0, "silver": 50.0, "gold": 600.0},
            "reset_period": "none"
        }]"#;
        assert!(matches!(
            BadgeCatalog::load_from_json(json),
            Err(CatalogError::Invalid(_, _))
        ));
    }

    #[test]
    fn test_rejects_count_without_condition() {
        let json = r#"[{
            "id": 1,
            "code": "no_condition",
            "name": "No Condition",
            "family": "standard",
            "criteria": "count",
            "thresholds": {"bronze": 5.0, "silver": 15.0, "gold": 30.0},
            "reset_period": "none"
        }]"#;
        assert!(matches!(
            BadgeCatalog::load_from_json(json),
            Err(CatalogError::Invalid(_, _))
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[
            {
                "id": 1, "code": "a", "name": "A", "family": "standard",
                "criteria": "cumulative", "metric": "distance_km",
                "thresholds": {"bronze": 1.0, "silver": 2.0, "gold": 3.0},
                "reset_period": "none"
            },
            {
                "id": 1, "code": "b", "name": "B", "family": "standard",
                "criteria": "cumulative", "metric": "distance_km",
                "thresholds": {"bronze": 1.0, "silver": 2.0, "gold": 3.0},
                "reset_period": "none"
            }
        ]"#;
        assert!(matches!(
            BadgeCatalog::load_from_json(json),
            Err(CatalogError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_inactive_definitions_filtered() {
        let json = r#"[{
            "id": 1,
            "code": "retired",
            "name": "Retired",
            "family": "standard",
            "criteria": "cumulative",
            "metric": "distance_km",
            "thresholds": {"bronze": 1.0, "silver": 2.0, "gold": 3.0},
            "reset_period": "none",
            "is_active": false
        }]"#;
        let catalog = BadgeCatalog::load_from_json(json).unwrap();
        assert_eq!(catalog.definitions().len(), 1);
        assert_eq!(catalog.active().count(), 0);
    }
}
