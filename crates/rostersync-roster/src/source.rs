//! Roster source contract and HTTP implementation.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::{RosterError, RosterResult};

/// Provider of the raw roster document.
///
/// Implementations may retry or follow redirects internally; the engine only
/// needs the final text. A failure aborts the cycle for the calling scope.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch the raw roster text.
    async fn fetch(&self) -> RosterResult<String>;
}

/// Roster source backed by an HTTP export URL (e.g. a published
/// spreadsheet). Redirects are followed by the underlying client; a
/// cache-busting query parameter defeats intermediary caching so each cycle
/// observes the current document.
pub struct HttpRosterSource {
    url: Url,
    client: reqwest::Client,
}

impl HttpRosterSource {
    /// Create a source for the given export URL.
    pub fn new(url: &str) -> RosterResult<Self> {
        let url = Url::parse(url).map_err(|e| RosterError::InvalidUrl {
            message: e.to_string(),
        })?;
        Ok(Self {
            url,
            client: reqwest::Client::new(),
        })
    }

    fn cache_busted_url(&self) -> Url {
        let mut url = self.url.clone();
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        url.query_pairs_mut().append_pair("_cb", &stamp.to_string());
        url
    }
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    async fn fetch(&self) -> RosterResult<String> {
        let url = self.cache_busted_url();
        debug!(url = %self.url, "fetching roster");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RosterError::fetch_with_source("request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RosterError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| RosterError::fetch_with_source("reading body failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rejects_invalid_url() {
        assert!(matches!(
            HttpRosterSource::new("not a url"),
            Err(RosterError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn cache_buster_is_appended() {
        let source = HttpRosterSource::new("https://example.com/export?format=csv").unwrap();
        let url = source.cache_busted_url();
        assert!(url.query_pairs().any(|(k, _)| k == "_cb"));
        assert!(url.query_pairs().any(|(k, v)| k == "format" && v == "csv"));
    }

    #[tokio::test]
    async fn fetches_document_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/roster.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("id,signed\n123,true\n"))
            .mount(&server)
            .await;

        let source = HttpRosterSource::new(&format!("{}/roster.csv", server.uri())).unwrap();
        let text = source.fetch().await.unwrap();
        assert_eq!(text, "id,signed\n123,true\n");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let source = HttpRosterSource::new(&server.uri()).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, RosterError::Status { status: 403 }));
    }
}
