//! The seam between the initialization cache and the evaluation engine.
//!
//! The cache never looks inside the engine: it constructs one with [`FeatureEngine::new`], hands it
//! the fetched features through [`FeatureEngine::load_features`] and stores the result.
use serde_json::Value;

use crate::{features::FeatureMap, Result, LOG_TARGET};

/// Mode flags captured at configuration time and passed to the engine constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Emit per-feature diagnostics while loading.
    pub enable_dev_mode: bool,
}

/// An evaluation engine that can be initialized from a features payload.
pub trait FeatureEngine: Send + Sync + 'static {
    /// Construct an empty engine. Construction never fails.
    fn new(options: EngineOptions) -> Self
    where
        Self: Sized;

    /// Load features into the engine, replacing whatever it held before.
    ///
    /// # Errors
    ///
    /// Return [`Error::EngineLoad`](crate::Error::EngineLoad) if the payload cannot be used. The
    /// error becomes the cached initialization failure.
    fn load_features(&mut self, features: FeatureMap) -> Result<()>;
}

/// Engine that answers every lookup with the feature's default value.
#[derive(Debug, Default)]
pub struct DefaultValueEngine {
    options: EngineOptions,
    features: FeatureMap,
}

impl DefaultValueEngine {
    /// Value of the feature, or `None` if the feature is unknown.
    pub fn feature_value(&self, key: &str) -> Option<&Value> {
        self.features
            .get(key)
            .map(|feature| &feature.default_value)
    }

    /// Whether the feature is on. Unknown features are off, as are `null`, `false`, `0` and the
    /// empty string.
    pub fn is_on(&self, key: &str) -> bool {
        self.feature_value(key).map_or(false, is_truthy)
    }

    /// Keys of all loaded features.
    pub fn feature_keys(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Options the engine was constructed with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl FeatureEngine for DefaultValueEngine {
    fn new(options: EngineOptions) -> DefaultValueEngine {
        DefaultValueEngine {
            options,
            features: FeatureMap::new(),
        }
    }

    fn load_features(&mut self, features: FeatureMap) -> Result<()> {
        if self.options.enable_dev_mode {
            for (key, feature) in &features {
                log::trace!(target: LOG_TARGET,
                    feature_key = key.as_str(),
                    default_value:serde = feature.default_value;
                    "loaded feature");
            }
        }
        self.features = features;
        Ok(())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
