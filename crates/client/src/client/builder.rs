//! Client builder for constructing [`HumioClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Converting a `humio_config::ClusterConfig` into client settings
//! - Normalizing the base URL (removing trailing slashes)
//! - Configuring the underlying HTTP clients (connect timeout, redirects, TLS verification)
//! - Giving the streaming client a per-read timeout instead of a total deadline
//!
//! # What this module does NOT handle:
//! - Actual API calls (handled by [`HumioClient`] methods)
//! - Per-request timeouts of short-lived calls (set by each endpoint from [`SearchSettings`])
//!
//! # Invariants
//! - `base_url` and `token` are required and must be provided before calling `build()`
//! - `skip_verify` only affects HTTPS connections; HTTP connections log a warning

use std::time::Duration;

use humio_config::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_REDIRECTS};
use humio_config::{ClusterConfig, SearchSettings};
use secrecy::{ExposeSecret, SecretString};

use crate::client::HumioClient;
use crate::endpoints::{SleepFn, StreamRetryPolicy};
use crate::error::{ClientError, Result};

/// Builder for creating a new [`HumioClient`].
#[derive(Default)]
pub struct HumioClientBuilder {
    cluster_name: Option<String>,
    base_url: Option<String>,
    token: Option<SecretString>,
    skip_verify: bool,
    settings: SearchSettings,
    stream_sleep: Option<SleepFn>,
}

impl HumioClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the cluster, e.g. `https://cloud.humio.com`.
    ///
    /// Trailing slashes will be automatically removed.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the cluster name echoed in results.
    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this for deployments with self-signed certificates. Disabling
    /// TLS verification makes the connection vulnerable to man-in-the-middle attacks.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the search tuning (timeouts, poll interval, retry, strategy).
    pub fn search_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the sleep used between streaming retries.
    pub fn stream_sleep(mut self, sleep: SleepFn) -> Self {
        self.stream_sleep = Some(sleep);
        self
    }

    /// Create a client builder from a configured cluster.
    pub fn from_cluster(mut self, cluster: &ClusterConfig) -> Self {
        self.cluster_name = Some(cluster.name.clone());
        self.base_url = Some(cluster.url.clone());
        self.token = Some(cluster.token.clone());
        self.skip_verify = cluster.skip_ssl_verify;
        self
    }

    /// Normalize a base URL by removing trailing slashes.
    fn normalize_base_url(url: &str) -> String {
        url.trim().trim_end_matches('/').to_string()
    }

    /// Connection settings shared by the short-lived and streaming clients.
    fn http_builder(accept_invalid_certs: bool) -> reqwest::ClientBuilder {
        let builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));
        if accept_invalid_certs {
            builder.danger_accept_invalid_certs(true)
        } else {
            builder
        }
    }

    /// Build the [`HumioClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` is missing or not an http(s) URL.
    /// Returns [`ClientError::MissingToken`] if `token` is missing or blank.
    /// Returns `ClientError::HttpError` if the HTTP client fails to build.
    pub fn build(self) -> Result<HumioClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::InvalidUrl("base_url is required".to_string()))?;
        let base_url = Self::normalize_base_url(&base_url);

        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "scheme must be http or https, got: {}",
                parsed.scheme()
            )));
        }

        let token = self
            .token
            .filter(|t| !t.expose_secret().trim().is_empty())
            .ok_or(ClientError::MissingToken)?;

        let accept_invalid_certs = if self.skip_verify && parsed.scheme() != "https" {
            tracing::warn!(
                "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
            );
            false
        } else {
            self.skip_verify
        };

        let http = Self::http_builder(accept_invalid_certs).build()?;
        let stream_http = Self::http_builder(accept_invalid_certs)
            .read_timeout(self.settings.stream_timeout)
            .build()?;

        let mut stream_retry = StreamRetryPolicy::new(
            self.settings.max_stream_attempts,
            self.settings.stream_backoff_step,
        );
        if let Some(sleep) = self.stream_sleep {
            stream_retry = stream_retry.with_sleep(sleep);
        }

        Ok(HumioClient {
            http,
            stream_http,
            cluster_name: self.cluster_name.unwrap_or_else(|| "default".to_string()),
            base_url,
            token,
            settings: self.settings,
            stream_retry,
        })
    }
}
