use std::sync::Arc;

use serde_json::Value;

use crate::{
    engine::{EngineOptions, FeatureEngine},
    fetcher::{FeatureSource, FeaturesFetcher},
    singleton::{InitState, LazySingleton},
    ClientConfig, DefaultValueEngine, Result, LOG_TARGET,
};

/// A handle to a lazily initialized evaluation engine.
///
/// The engine is built on the first [`FeaturesClient::ensure`]: features are fetched from the
/// server, a fresh engine is constructed and the features are loaded into it. This happens at most
/// once per client, however many callers ask concurrently. Failures are cached as well and are not
/// retried.
///
/// Cloning the client is cheap and every clone shares the same engine.
///
/// # Examples
/// ```
/// # async fn test() {
/// use feature_bootstrap::ClientConfig;
///
/// let client = ClientConfig::from_client_key("sdk-abc123").to_client();
///
/// let banner = client.get_string("banner_text", "Welcome").await;
/// # }
/// ```
pub struct FeaturesClient<E = DefaultValueEngine> {
    engine: LazySingleton<E>,
}

impl<E> Clone for FeaturesClient<E> {
    fn clone(&self) -> Self {
        FeaturesClient {
            engine: self.engine.clone(),
        }
    }
}

impl<E> std::fmt::Debug for FeaturesClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturesClient")
            .field("engine", &self.engine)
            .finish()
    }
}

impl<E: FeatureEngine> FeaturesClient<E> {
    /// Create a new client fetching features over HTTP as described by `config`.
    ///
    /// Nothing happens until the first [`FeaturesClient::ensure`]. Configuration problems (e.g., an
    /// invalid API host) are reported by `ensure` as well.
    pub fn new(config: ClientConfig) -> Self {
        FeaturesClient {
            engine: LazySingleton::new(move || async move {
                let fetcher = FeaturesFetcher::new(&config)?;
                log::debug!(target: LOG_TARGET, url:% = fetcher.url(); "initializing features");
                initialize(&fetcher, config.engine_options).await
            }),
        }
    }

    /// Create a new client that takes features from a custom `source`.
    pub fn with_source<S: FeatureSource>(source: S, options: EngineOptions) -> Self {
        FeaturesClient {
            engine: LazySingleton::new(move || async move { initialize(&source, options).await }),
        }
    }

    /// Return the initialized engine, initializing it on first use.
    ///
    /// See [`LazySingleton::ensure`] for the sharing and caching guarantees.
    ///
    /// # Errors
    ///
    /// Returns the (cached) initialization failure. Callers are expected to degrade gracefully,
    /// e.g., by falling back to hard-coded defaults.
    pub async fn ensure(&self) -> Result<Arc<E>> {
        self.engine.ensure().await
    }

    /// Same as [`FeaturesClient::ensure`] but returns `None` on failure.
    pub async fn ensure_or_absent(&self) -> Option<Arc<E>> {
        self.engine.ensure_or_absent().await
    }

    /// Return the engine if it's already initialized, without waiting.
    pub fn get(&self) -> Option<Arc<E>> {
        self.engine.get()
    }

    /// Return the initialization state.
    pub fn state(&self) -> InitState {
        self.engine.state()
    }
}

impl FeaturesClient<DefaultValueEngine> {
    /// Get the value of the feature. Returns `None` if features are unavailable or the feature
    /// does not exist.
    pub async fn get_feature_value(&self, key: &str) -> Option<Value> {
        self.lookup(key, |value| Some(value.clone())).await
    }

    /// Get a string feature, falling back to `default`.
    pub async fn get_string(&self, key: &str, default: &str) -> String {
        self.lookup(key, |value| value.as_str().map(str::to_owned))
            .await
            .unwrap_or_else(|| default.to_owned())
    }

    /// Get a boolean feature, falling back to `default`.
    pub async fn get_bool(&self, key: &str, default: bool) -> bool {
        self.lookup(key, Value::as_bool).await.unwrap_or(default)
    }

    /// Get a numeric feature, falling back to `default`.
    pub async fn get_number(&self, key: &str, default: f64) -> f64 {
        self.lookup(key, Value::as_f64).await.unwrap_or(default)
    }

    /// Whether the feature is on. Returns `false` if features are unavailable.
    pub async fn is_on(&self, key: &str) -> bool {
        match self.ensure_or_absent().await {
            Some(engine) => engine.is_on(key),
            None => false,
        }
    }

    async fn lookup<T>(&self, key: &str, convert: fn(&Value) -> Option<T>) -> Option<T> {
        let Some(engine) = self.ensure_or_absent().await else {
            log::debug!(target: LOG_TARGET, feature_key = key; "features unavailable, serving default");
            return None;
        };

        let value = engine.feature_value(key).and_then(convert);
        if value.is_none() {
            log::debug!(target: LOG_TARGET, feature_key = key; "feature missing or has unexpected type, serving default");
        }
        value
    }
}

/// Fetch features, construct an engine and load the features into it.
async fn initialize<E: FeatureEngine, S: FeatureSource>(
    source: &S,
    options: EngineOptions,
) -> Result<E> {
    let response = source.fetch().await?;

    let mut engine = E::new(options);
    engine.load_features(response.features)?;

    Ok(engine)
}
