//! Sync policy switches.

use serde::Deserialize;

/// Policy switches governing which diffs are computed and executed.
///
/// The three switches are independent; see the diff engine for how each
/// behaves under degraded observation.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncPolicy {
    /// Revoke the group from holders missing from the allowed set.
    /// Requires high-fidelity observation; skipped with a warning otherwise.
    #[serde(default)]
    pub remove_missing: bool,

    /// Revoke the group from identities declared explicitly not signed.
    #[serde(default = "default_remove_denied")]
    pub remove_denied: bool,

    /// Ban scope members declared explicitly not signed.
    #[serde(default)]
    pub ban_non_signed: bool,

    /// Audit reason recorded with ban operations.
    #[serde(default = "default_ban_reason")]
    pub ban_reason: String,
}

fn default_remove_denied() -> bool {
    true
}

fn default_ban_reason() -> String {
    "agreement not signed (roster sync)".to_string()
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            remove_missing: false,
            remove_denied: default_remove_denied(),
            ban_non_signed: false,
            ban_reason: default_ban_reason(),
        }
    }
}

impl SyncPolicy {
    /// Whether changes to the denied set can affect this policy's outcome.
    #[must_use]
    pub fn denied_matters(&self) -> bool {
        self.ban_non_signed || self.remove_denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = SyncPolicy::default();
        assert!(!policy.remove_missing);
        assert!(policy.remove_denied);
        assert!(!policy.ban_non_signed);
        assert!(policy.denied_matters());
    }

    #[test]
    fn denied_matters_only_under_denying_policies() {
        let policy = SyncPolicy {
            remove_missing: true,
            remove_denied: false,
            ban_non_signed: false,
            ..SyncPolicy::default()
        };
        assert!(!policy.denied_matters());

        let policy = SyncPolicy {
            ban_non_signed: true,
            remove_denied: false,
            ..SyncPolicy::default()
        };
        assert!(policy.denied_matters());
    }
}
