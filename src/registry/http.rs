// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! openHAB REST implementation of [`ItemRegistry`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};

use crate::config::Snapshot;
use crate::error::RegistryError;
use crate::registry::{Item, ItemRegistry};

// ============================================================================
// RegistryConfig
// ============================================================================

/// Connection settings for the item registry.
///
/// # Examples
///
/// ```
/// use assistant_bridge::registry::RegistryConfig;
/// use std::time::Duration;
///
/// let config = RegistryConfig::new("http://openhab.local:8080/")
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(config.base_url(), "http://openhab.local:8080");
/// assert_eq!(config.timeout(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    base_url: String,
    timeout: Duration,
}

impl RegistryConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Snapshot::DEFAULT_TIMEOUT;

    /// Creates a configuration for the registry at `base_url`.
    ///
    /// A missing scheme defaults to `http://`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/');
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url.to_string()
        } else {
            format!("http://{base_url}")
        };

        Self {
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Creates a configuration from a configuration snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::new(snapshot.registry_url()).with_timeout(snapshot.timeout())
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`HttpRegistry`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL has no host or the HTTP client cannot be
    /// created.
    pub fn into_client(self) -> Result<HttpRegistry, RegistryError> {
        let host = self
            .base_url
            .split_once("://")
            .map_or("", |(_, rest)| rest);
        if host.is_empty() {
            return Err(RegistryError::InvalidUrl(self.base_url));
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(RegistryError::Http)?;

        Ok(HttpRegistry {
            base_url: self.base_url,
            client,
        })
    }
}

// ============================================================================
// HttpRegistry
// ============================================================================

/// HTTP client for the openHAB item REST API.
///
/// - `GET  {base}/rest/items` lists all items
/// - `GET  {base}/rest/items/{name}` reads one item
/// - `POST {base}/rest/items/{name}` sends a command as `text/plain`
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base_url: String,
    client: Client,
}

impl HttpRegistry {
    /// Creates a registry client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RegistryError> {
        RegistryConfig::new(base_url).into_client()
    }

    /// Creates a registry client from a configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, RegistryError> {
        RegistryConfig::from_snapshot(snapshot).into_client()
    }

    /// Returns the base URL of the registry.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn items_url(&self) -> String {
        format!("{}/rest/items", self.base_url)
    }

    fn item_url(&self, name: &str) -> String {
        format!("{}/rest/items/{}", self.base_url, urlencoding::encode(name))
    }
}

fn check_status(response: &Response) -> Result<(), RegistryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(RegistryError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

impl ItemRegistry for HttpRegistry {
    async fn fetch_all(&self) -> Result<Vec<Item>, RegistryError> {
        let url = self.items_url();

        tracing::debug!(url = %url, "Fetching all items");

        let response = self.client.get(&url).send().await?;
        check_status(&response)?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_one(&self, name: &str) -> Result<Item, RegistryError> {
        let url = self.item_url(name);

        tracing::debug!(url = %url, "Fetching item");

        let response = self.client.get(&url).send().await?;
        check_status(&response)?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn write(&self, name: &str, value: &str) -> Result<(), RegistryError> {
        let url = self.item_url(name);

        tracing::debug!(url = %url, value = %value, "Writing item");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(value.to_string())
            .send()
            .await?;
        check_status(&response)
    }
}
