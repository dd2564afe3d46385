//! REST implementation of the directory client.
//!
//! Speaks a plain JSON resource API:
//!
//! - `GET    /scopes`
//! - `GET    /scopes/{scope}/groups`
//! - `GET    /scopes/{scope}/groups/{group}`
//! - `GET    /scopes/{scope}/members`
//! - `GET    /scopes/{scope}/members/{member}`
//! - `PUT    /scopes/{scope}/members/{member}/groups/{group}`
//! - `DELETE /scopes/{scope}/members/{member}/groups/{group}`
//! - `PUT    /scopes/{scope}/bans/{member}`
//!
//! Mutations carry a JSON body with an audit `reason`. Probe methods always
//! hit the API; nothing is cached, which is what the engine's read-after-write
//! verification depends on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use rostersync_directory::{
    DirectoryClient, DirectoryError, DirectoryResult, GroupId, GroupSelector, Member, ScopeId,
    UserId,
};

use crate::config::RestDirectoryConfig;

/// Directory client backed by a REST API.
pub struct RestDirectoryClient {
    config: RestDirectoryConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ScopeRecord {
    id: ScopeId,
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    id: GroupId,
    #[serde(default)]
    name: String,
}

impl RestDirectoryClient {
    /// Create a client from a validated configuration.
    pub fn new(config: RestDirectoryConfig) -> DirectoryResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

        if let Some(ref token) = config.token {
            let mut headers = header::HeaderMap::new();
            let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| DirectoryError::invalid_response(format!("invalid token: {e}")))?;
            headers.insert(header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|e| {
            DirectoryError::invalid_response(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self { config, client })
    }

    fn transport_error(e: reqwest::Error) -> DirectoryError {
        if e.is_timeout() {
            DirectoryError::Timeout
        } else if e.is_connect() {
            DirectoryError::connection_failed_with_source("connect failed", e)
        } else {
            DirectoryError::network_with_source("request failed", e)
        }
    }

    fn status_error(status: StatusCode, operation: &str) -> DirectoryError {
        match status {
            StatusCode::UNAUTHORIZED => DirectoryError::AuthenticationFailed,
            StatusCode::FORBIDDEN => DirectoryError::PermissionDenied {
                operation: operation.to_string(),
            },
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => DirectoryError::Unavailable {
                message: format!("{operation}: HTTP {status}"),
            },
            _ => DirectoryError::operation_failed(format!("{operation}: HTTP {status}")),
        }
    }

    async fn get(&self, path: &str, operation: &str) -> DirectoryResult<Response> {
        let url = self.config.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::status_error(status, operation))
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: Response,
        operation: &str,
    ) -> DirectoryResult<T> {
        response.json().await.map_err(|e| {
            DirectoryError::invalid_response(format!("{operation}: malformed body: {e}"))
        })
    }

    async fn mutate(
        &self,
        method: reqwest::Method,
        path: &str,
        reason: &str,
        operation: &str,
    ) -> DirectoryResult<()> {
        let url = self.config.url(path);
        let response = self
            .client
            .request(method, &url)
            .json(&json!({ "reason": reason }))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, operation))
        }
    }
}

#[async_trait]
impl DirectoryClient for RestDirectoryClient {
    #[instrument(skip(self))]
    async fn list_scopes(&self) -> DirectoryResult<Vec<ScopeId>> {
        let response = self.get("/scopes", "list scopes").await?;
        let records: Vec<ScopeRecord> = Self::parse_json(response, "list scopes").await?;
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    #[instrument(skip(self, selector))]
    async fn resolve_group(
        &self,
        scope: &ScopeId,
        selector: &GroupSelector,
    ) -> DirectoryResult<GroupId> {
        // A configured id is verified with a point lookup; a name falls back
        // to scanning the scope's group list.
        if let Some(ref id) = selector.id {
            let url = self.config.url(&format!("/scopes/{scope}/groups/{id}"));
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(Self::transport_error)?;

            return match response.status() {
                status if status.is_success() => Ok(id.clone()),
                StatusCode::NOT_FOUND => Err(DirectoryError::GroupNotFound {
                    scope_id: scope.clone(),
                }),
                status => Err(Self::status_error(status, "resolve group")),
            };
        }

        let Some(ref name) = selector.name else {
            return Err(DirectoryError::GroupNotFound {
                scope_id: scope.clone(),
            });
        };

        let response = self
            .get(&format!("/scopes/{scope}/groups"), "list groups")
            .await?;
        let groups: Vec<GroupRecord> = Self::parse_json(response, "list groups").await?;

        groups
            .into_iter()
            .find(|g| g.name == *name)
            .map(|g| g.id)
            .ok_or_else(|| DirectoryError::GroupNotFound {
                scope_id: scope.clone(),
            })
    }

    #[instrument(skip(self))]
    async fn list_members(&self, scope: &ScopeId) -> DirectoryResult<Vec<Member>> {
        let response = self
            .get(&format!("/scopes/{scope}/members"), "list members")
            .await?;
        let members: Vec<Member> = Self::parse_json(response, "list members").await?;
        debug!(scope_id = %scope, count = members.len(), "listed scope members");
        Ok(members)
    }

    #[instrument(skip(self))]
    async fn fetch_member(
        &self,
        scope: &ScopeId,
        user: &UserId,
    ) -> DirectoryResult<Option<Member>> {
        let url = self.config.url(&format!("/scopes/{scope}/members/{user}"));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        match response.status() {
            status if status.is_success() => {
                let member = Self::parse_json(response, "fetch member").await?;
                Ok(Some(member))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Self::status_error(status, "fetch member")),
        }
    }

    async fn member_has_group(
        &self,
        scope: &ScopeId,
        user: &UserId,
        group: &GroupId,
    ) -> DirectoryResult<bool> {
        match self.fetch_member(scope, user).await? {
            Some(member) => Ok(member.has_group(group)),
            None => Ok(false),
        }
    }

    #[instrument(skip(self, reason))]
    async fn grant_group(
        &self,
        scope: &ScopeId,
        user: &UserId,
        group: &GroupId,
        reason: &str,
    ) -> DirectoryResult<()> {
        self.mutate(
            reqwest::Method::PUT,
            &format!("/scopes/{scope}/members/{user}/groups/{group}"),
            reason,
            "grant group",
        )
        .await
    }

    #[instrument(skip(self, reason))]
    async fn revoke_group(
        &self,
        scope: &ScopeId,
        user: &UserId,
        group: &GroupId,
        reason: &str,
    ) -> DirectoryResult<()> {
        self.mutate(
            reqwest::Method::DELETE,
            &format!("/scopes/{scope}/members/{user}/groups/{group}"),
            reason,
            "revoke group",
        )
        .await
    }

    #[instrument(skip(self, reason))]
    async fn ban_member(&self, scope: &ScopeId, user: &UserId, reason: &str) -> DirectoryResult<()> {
        self.mutate(
            reqwest::Method::PUT,
            &format!("/scopes/{scope}/bans/{user}"),
            reason,
            "ban member",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        assert!(RestDirectoryClient::new(RestDirectoryConfig::new("")).is_err());
        assert!(RestDirectoryClient::new(RestDirectoryConfig::new("not-a-url")).is_err());
    }

    #[test]
    fn accepts_valid_config() {
        let config =
            RestDirectoryConfig::new("https://directory.example.com/api").with_token("secret");
        assert!(RestDirectoryClient::new(config).is_ok());
    }
}
