//! Wire models of the features endpoint.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feature definitions keyed by feature key.
pub type FeatureMap = HashMap<String, FeatureDefinition>;

/// Document returned by the features endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesResponse {
    /// All features known to the server.
    #[serde(default)]
    pub features: FeatureMap,
    /// When the feature set was last modified on the server.
    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
}

/// A single feature as sent by the server.
///
/// Only `defaultValue` is interpreted here. Everything else (targeting rules, experiments) is kept
/// verbatim in `extra` for engines that understand it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDefinition {
    /// Value served when no rule applies. `null` if the server omits it.
    #[serde(default)]
    pub default_value: serde_json::Value,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FeatureDefinition {
    /// Create a definition that only carries a default value.
    pub fn with_default(default_value: impl Into<serde_json::Value>) -> FeatureDefinition {
        FeatureDefinition {
            default_value: default_value.into(),
            extra: serde_json::Map::new(),
        }
    }
}
