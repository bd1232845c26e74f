//! Lazily initialized feature flags for Rust services.
//!
//! # Overview
//!
//! The crate revolves around a [`FeaturesClient`]: a cheap, cloneable handle that owns a feature
//! evaluation engine which is initialized on first use. Initialization fetches feature
//! definitions from the server, constructs the engine and loads the definitions into it. It runs
//! at most once per client: callers that arrive while it is in flight wait for the same outcome,
//! and callers that arrive later get the cached engine right away.
//!
//! The single-flight machinery is available on its own as [`LazySingleton`], for any expensive
//! asynchronous value that should be computed once and shared.
//!
//! ```
//! # async fn test() {
//! use feature_bootstrap::ClientConfig;
//!
//! let client = ClientConfig::from_client_key("sdk-abc123").to_client();
//!
//! if client.is_on("dark_mode").await {
//!     // ...
//! }
//! # }
//! ```
//!
//! # Engines
//!
//! Feature evaluation (targeting rules, experiments, bucketing) is the job of the engine, which is
//! plugged in through the [`FeatureEngine`] trait. The bundled [`DefaultValueEngine`] serves each
//! feature's default value.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum.
//!
//! Initialization failures never panic. They are logged once, cached, and returned from every
//! [`FeaturesClient::ensure`] call; there is no automatic retry. The typed accessors such as
//! [`FeaturesClient::get_string`] take a default that is served whenever features are unavailable,
//! as feature flags should not be critical enough to cause system crashes.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging messages under
//! the `feature_bootstrap` target. Consider integrating a `log`-compatible logger implementation
//! for better visibility into initialization.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;

pub mod engine;
pub mod features;
pub mod fetcher;
pub mod singleton;

pub use client::FeaturesClient;
pub use config::ClientConfig;
pub use engine::{DefaultValueEngine, EngineOptions, FeatureEngine};
pub use error::{Error, Result};
pub use fetcher::{FeatureSource, FeaturesFetcher};
pub use singleton::{InitState, LazySingleton};

/// Log target used by every message of this crate.
pub(crate) const LOG_TARGET: &str = "feature_bootstrap";
