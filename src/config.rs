//! Client configuration.
//!
//! A [`ClientConfig`] names the search domain endpoint and the API version
//! requests are made against. It can be built in code or loaded from a JSON
//! file:
//!
//! ```json
//! { "endpoint": "search-movies-abc123.us-west-2.cloudsearch.amazonaws.com" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CloudSearchError, Result};
use crate::query::params::{QueryParams, search_path};

/// The API version requests are made against by default.
pub const LATEST_API_VERSION: &str = "2011-02-01";

/// Region assumed when the endpoint host does not name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Endpoint settings for query and document clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Domain endpoint, either a bare host or a full URL.
    #[serde(default)]
    pub endpoint: String,

    /// Scheme used when the endpoint is a bare host.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_api_version() -> String {
    LATEST_API_VERSION.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            scheme: default_scheme(),
            api_version: default_api_version(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for an endpoint with default settings.
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the scheme used for bare hosts.
    pub fn with_scheme<S: Into<String>>(mut self, scheme: S) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the API version.
    pub fn with_api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        log::debug!("loaded client config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Check that an endpoint is present.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(CloudSearchError::invalid_config(
                "You must provide the endpoint for the CloudSearch domain",
            ));
        }
        Ok(())
    }

    /// Base URL of the domain, with the scheme prefixed to bare hosts.
    pub fn base_url(&self) -> Result<String> {
        self.validate()?;
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.starts_with("http") {
            Ok(endpoint.to_string())
        } else {
            Ok(format!("{}://{endpoint}", self.scheme))
        }
    }

    /// Host part of the endpoint.
    pub fn host(&self) -> Result<String> {
        let base = self.base_url()?;
        let rest = base.split_once("://").map_or(base.as_str(), |(_, rest)| rest);
        let host = rest.split(['/', ':']).next().unwrap_or_default();
        Ok(host.to_string())
    }

    /// Region named by the endpoint host.
    ///
    /// Domain endpoints look like `search-<domain>-<id>.<region>.cloudsearch.amazonaws.com`,
    /// so the region is the second label of the host.
    pub fn region(&self) -> Result<String> {
        let host = self.host()?;
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() >= 2 {
            Ok(labels[1].to_string())
        } else {
            Ok(DEFAULT_REGION.to_string())
        }
    }

    /// Full search URL for a parameter mapping.
    pub fn search_url(&self, params: &QueryParams) -> Result<String> {
        let mut url = format!("{}{}", self.base_url()?, search_path(&self.api_version));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string());
        }
        Ok(url)
    }

    /// URL of the document batch endpoint.
    pub fn batch_url(&self) -> Result<String> {
        Ok(format!(
            "{}/{}/documents/batch",
            self.base_url()?,
            self.api_version
        ))
    }
}
