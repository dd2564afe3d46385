//! Daemon configuration loaded from environment variables.

use std::env;

use thiserror::Error;

use rostersync_directory::{GroupId, GroupSelector, ScopeId};
use rostersync_engine::{EngineConfig, SyncPolicy};
use rostersync_roster::{ColumnConfig, FieldSelector};

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Full daemon configuration.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Roster export URL.
    pub roster_url: String,
    /// Directory API base URL.
    pub directory_base_url: String,
    /// Directory API bearer token.
    pub directory_token: Option<String>,
    /// Pin reconciliation to one scope; absent means all reachable scopes.
    pub scope: Option<ScopeId>,
    /// Delay between reconciliation passes.
    pub sync_interval_ms: u64,
    /// Engine configuration (group, columns, policy, concurrency).
    pub engine: EngineConfig,
}

impl DaemonConfig {
    /// Load configuration from the environment.
    ///
    /// Required: `ROSTER_URL`, `DIRECTORY_BASE_URL`, and one of `GROUP_ID` /
    /// `GROUP_NAME`. Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let roster_url = require("ROSTER_URL")?;
        let directory_base_url = require("DIRECTORY_BASE_URL")?;
        let directory_token = optional("DIRECTORY_TOKEN");

        let group = match (optional("GROUP_ID"), optional("GROUP_NAME")) {
            (Some(id), _) => GroupSelector::by_id(GroupId::new(id)),
            (None, Some(name)) => GroupSelector::by_name(name),
            (None, None) => return Err(ConfigError::Missing("GROUP_ID or GROUP_NAME")),
        };

        let columns = ColumnConfig {
            identity: field_selector("ROSTER_ID_FIELD", "ROSTER_ID_INDEX", Some("id"))?,
            signed: field_selector("ROSTER_SIGNED_FIELD", "ROSTER_SIGNED_INDEX", Some("signed"))?,
            scope: field_selector("ROSTER_SCOPE_FIELD", "ROSTER_SCOPE_INDEX", None)?,
        };

        let default_policy = SyncPolicy::default();
        let policy = SyncPolicy {
            remove_missing: bool_var("REMOVE_MISSING", default_policy.remove_missing)?,
            remove_denied: bool_var("REMOVE_DENIED", default_policy.remove_denied)?,
            ban_non_signed: bool_var("BAN_NON_SIGNED", default_policy.ban_non_signed)?,
            ban_reason: optional("BAN_REASON").unwrap_or(default_policy.ban_reason),
        };

        let default_engine = EngineConfig::default();
        let engine = EngineConfig {
            group,
            columns,
            policy,
            high_fidelity: bool_var("HIGH_FIDELITY", default_engine.high_fidelity)?,
            concurrency: usize_var("SYNC_CONCURRENCY", default_engine.concurrency)?,
        };

        Ok(Self {
            roster_url,
            directory_base_url,
            directory_token,
            scope: optional("SCOPE_ID").map(ScopeId::new),
            sync_interval_ms: u64_var("SYNC_INTERVAL_MS", 10_000)?,
            engine,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn bool_var(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
            var,
            message: format!("expected a boolean, got '{raw}'"),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn u64_var(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            message: format!("expected an integer, got '{raw}'"),
        }),
    }
}

fn usize_var(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            message: format!("expected an integer, got '{raw}'"),
        }),
    }
}

fn field_selector(
    name_var: &'static str,
    index_var: &'static str,
    default_name: Option<&str>,
) -> Result<FieldSelector, ConfigError> {
    let index = match optional(index_var) {
        None => None,
        Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
            var: index_var,
            message: format!("expected a 1-based column index, got '{raw}'"),
        })?),
    };

    let name = optional(name_var).or_else(|| {
        // Default column names apply only when no index pins the column.
        if index.is_some() {
            None
        } else {
            default_name.map(String::from)
        }
    });

    Ok(FieldSelector { name, index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boolean_tokens() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    // Environment-derived values are exercised in one test; parallel tests
    // sharing process environment would race.
    #[test]
    fn loads_from_env() {
        std::env::set_var("ROSTER_URL", "https://sheets.example.com/export");
        std::env::set_var("DIRECTORY_BASE_URL", "https://directory.example.com/api");
        std::env::set_var("GROUP_ID", "role-1");
        std::env::set_var("BAN_NON_SIGNED", "true");
        std::env::set_var("SYNC_INTERVAL_MS", "5000");
        std::env::set_var("ROSTER_SIGNED_INDEX", "3");

        let config = DaemonConfig::from_env().unwrap();
        assert_eq!(config.sync_interval_ms, 5000);
        assert!(config.engine.policy.ban_non_signed);
        assert!(config.engine.policy.remove_denied);
        assert_eq!(config.engine.concurrency, 3);
        assert_eq!(config.engine.columns.identity.name.as_deref(), Some("id"));
        assert_eq!(config.engine.columns.signed.index, Some(3));
        assert_eq!(config.engine.columns.signed.name, None);
        assert!(!config.engine.columns.scope.is_configured());
        assert!(config.scope.is_none());

        std::env::remove_var("ROSTER_URL");
        assert!(matches!(
            DaemonConfig::from_env(),
            Err(ConfigError::Missing("ROSTER_URL"))
        ));
    }
}
