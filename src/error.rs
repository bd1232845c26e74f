use std::sync::Arc;

/// Represents a result type for operations in this crate.
///
/// Every caller waiting on the same initialization receives a clone of the same `Result`, so the
/// error type is cheap to clone.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum representing possible failures of feature initialization.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Invalid API host configuration.
    #[error("invalid api_host configuration")]
    InvalidBaseUrl(#[source] url::ParseError),

    /// The request was rejected, the client key is likely invalid.
    #[error("unauthorized, client_key is likely invalid")]
    Unauthorized,

    /// Network error or non-success response from the features endpoint.
    #[error(transparent)]
    // reqwest::Error is not clonable, so we're wrapping it in an Arc.
    Network(Arc<reqwest::Error>),

    /// Response body is not a valid features document.
    #[error("error parsing features response")]
    ParseFailure(#[source] Arc<serde_json::Error>),

    /// The evaluation engine refused to load the features payload.
    #[error("engine failed to load features: {0}")]
    EngineLoad(String),

    /// The initializer panicked. This should normally never happen.
    #[error("initializer panicked")]
    InitializerPanicked,

    /// The runtime dropped the initializer before it published an outcome.
    #[error("initialization aborted before completion")]
    InitializationAborted,
}

impl Error {
    /// Returns `true` if the features could not be retrieved from the endpoint.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Unauthorized | Error::InvalidBaseUrl(_)
        )
    }

    /// Returns `true` if the endpoint responded but the body could not be parsed.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Error::ParseFailure(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Network(Arc::new(value.without_url()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::ParseFailure(Arc::new(value))
    }
}
