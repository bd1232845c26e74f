//! An HTTP client that fetches feature definitions from the server.
use std::future::Future;

use reqwest::{StatusCode, Url};

use crate::{features::FeaturesResponse, ClientConfig, Error, Result, LOG_TARGET};

/// Source of the remote features payload.
///
/// [`FeaturesFetcher`] is the HTTP implementation. Other implementations can be plugged into
/// [`FeaturesClient::with_source`](crate::FeaturesClient::with_source), e.g. to serve a payload
/// bundled with the application.
pub trait FeatureSource: Send + Sync + 'static {
    /// Retrieve the current features document.
    fn fetch(&self) -> impl Future<Output = Result<FeaturesResponse>> + Send;
}

/// A client that fetches features from the server.
#[derive(Debug)]
pub struct FeaturesFetcher {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: reqwest::Client,
    url: Url,
}

impl FeaturesFetcher {
    /// Create a fetcher for the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBaseUrl`] if the API host cannot be turned into a URL.
    /// - [`Error::Network`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<FeaturesFetcher> {
        let url = config.features_url()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(FeaturesFetcher { client, url })
    }

    /// Endpoint this fetcher requests.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl FeatureSource for FeaturesFetcher {
    async fn fetch(&self) -> Result<FeaturesResponse> {
        log::debug!(target: LOG_TARGET, "fetching features");
        let response = self.client.get(self.url.clone()).send().await?;

        let response = response.error_for_status().map_err(|err| {
            if matches!(
                err.status(),
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            ) {
                log::debug!(target: LOG_TARGET, "client is not authorized. Check your client key");
                Error::Unauthorized
            } else {
                log::debug!(target: LOG_TARGET, "received non-200 response while fetching features: {:?}", err);
                Error::from(err)
            }
        })?;

        let body = response.bytes().await?;
        let features: FeaturesResponse = serde_json::from_slice(&body)?;

        log::debug!(target: LOG_TARGET,
            feature_count = features.features.len();
            "successfully fetched features");

        Ok(features)
    }
}
