//! REST directory client configuration.

use serde::Deserialize;

use rostersync_directory::{DirectoryError, DirectoryResult};

/// Configuration for the REST directory client.
#[derive(Debug, Clone, Deserialize)]
pub struct RestDirectoryConfig {
    /// Base URL for directory API requests (e.g. "https://directory.example.com/api").
    pub base_url: String,

    /// Bearer token for authentication.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl RestDirectoryConfig {
    /// Create a config with the given base URL and defaults for the rest.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.base_url.is_empty() {
            return Err(DirectoryError::invalid_response("base_url is required"));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| DirectoryError::invalid_response(format!("invalid base_url: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DirectoryError::invalid_response(format!(
                "unsupported base_url scheme: {scheme}"
            ))),
        }
    }

    /// Build the full URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_base_url() {
        assert!(RestDirectoryConfig::new("https://directory.example.com/api")
            .validate()
            .is_ok());
        assert!(RestDirectoryConfig::new("").validate().is_err());
        assert!(RestDirectoryConfig::new("not-a-url").validate().is_err());
        assert!(RestDirectoryConfig::new("ftp://directory.example.com")
            .validate()
            .is_err());
    }

    #[test]
    fn joins_urls_without_duplicate_slashes() {
        let config = RestDirectoryConfig::new("https://directory.example.com/api/");
        assert_eq!(
            config.url("/scopes"),
            "https://directory.example.com/api/scopes"
        );
        assert_eq!(
            config.url("scopes"),
            "https://directory.example.com/api/scopes"
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RestDirectoryConfig =
            serde_json::from_str(r#"{"base_url": "https://d.example.com"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.token.is_none());
    }
}
