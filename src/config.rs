use std::time::Duration;

use reqwest::Url;

use crate::{
    engine::{EngineOptions, FeatureEngine},
    DefaultValueEngine, Error, FeaturesClient, Result,
};

const SDK_NAME: &str = "rust";

/// Configuration for [`FeaturesClient`].
///
/// # Examples
/// ```
/// # use feature_bootstrap::ClientConfig;
/// let client = ClientConfig::from_client_key("sdk-abc123")
///     .enable_dev_mode(true)
///     .to_client();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) client_key: String,
    pub(crate) api_host: String,
    pub(crate) request_timeout: Duration,
    pub(crate) engine_options: EngineOptions,
}

impl ClientConfig {
    /// Default host serving feature definitions.
    pub const DEFAULT_API_HOST: &'static str = "https://cdn.growthbook.io";

    /// Default timeout of the features request.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a default configuration using the specified client key.
    ///
    /// ```
    /// # use feature_bootstrap::ClientConfig;
    /// ClientConfig::from_client_key("sdk-abc123");
    /// ```
    pub fn from_client_key(client_key: impl Into<String>) -> Self {
        ClientConfig {
            client_key: client_key.into(),
            api_host: ClientConfig::DEFAULT_API_HOST.to_owned(),
            request_timeout: ClientConfig::DEFAULT_REQUEST_TIMEOUT,
            engine_options: EngineOptions::default(),
        }
    }

    /// Override the API host. Clients should use the default setting unless they run a
    /// self-hosted or proxied instance.
    pub fn api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// Override the timeout of the features request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Turn on engine diagnostics.
    pub fn enable_dev_mode(mut self, enable: bool) -> Self {
        self.engine_options.enable_dev_mode = enable;
        self
    }

    /// Options handed to the engine constructor.
    pub fn engine_options(&self) -> &EngineOptions {
        &self.engine_options
    }

    /// Create a new [`FeaturesClient`] backed by [`DefaultValueEngine`].
    ///
    /// Nothing is fetched until the first [`FeaturesClient::ensure`].
    pub fn to_client(self) -> FeaturesClient<DefaultValueEngine> {
        FeaturesClient::new(self)
    }

    /// Create a new [`FeaturesClient`] backed by a custom engine.
    pub fn to_client_with_engine<E: FeatureEngine>(self) -> FeaturesClient<E> {
        FeaturesClient::new(self)
    }

    /// URL of the features endpoint: `{api_host}/api/features/{client_key}`. The client key is
    /// percent-encoded as a single path segment.
    pub(crate) fn features_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_host).map_err(Error::InvalidBaseUrl)?;

        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["api", "features", self.client_key.as_str()]);

        url.query_pairs_mut()
            .append_pair("sdkName", SDK_NAME)
            .append_pair("sdkVersion", env!("CARGO_PKG_VERSION"));

        Ok(url)
    }
}
