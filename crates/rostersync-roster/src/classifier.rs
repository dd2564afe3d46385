//! Roster classification into desired-state sets.
//!
//! Walks the parsed rows, resolves the identity, signed and scope fields,
//! and partitions identities into the `allowed` and `denied` sets. A third
//! category of rows (blank or unrecognized signed value) influences neither
//! set: "declared not signed" and "unknown" are deliberately distinct.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;

use rostersync_directory::{ScopeId, UserId};

use crate::parser::Table;
use crate::selector::FieldSelector;

/// Three-outcome interpretation of the signed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedStatus {
    /// Explicit truthy token: `true`, `1`, `yes`, `y` (case-insensitive).
    Signed,
    /// Explicit falsy token: `false`, `0`, `no`, `n` (case-insensitive).
    NotSigned,
    /// Blank or unrecognized value.
    Unspecified,
}

impl SignedStatus {
    /// Classify a raw cell value.
    #[must_use]
    pub fn classify(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => SignedStatus::Signed,
            "false" | "0" | "no" | "n" => SignedStatus::NotSigned,
            _ => SignedStatus::Unspecified,
        }
    }
}

/// Column selectors for the three logical roster fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnConfig {
    /// Identity column (numeric directory id).
    #[serde(default)]
    pub identity: FieldSelector,
    /// Signed-flag column.
    #[serde(default)]
    pub signed: FieldSelector,
    /// Optional scope column; when configured, rows carrying a different
    /// scope value are filtered out.
    #[serde(default)]
    pub scope: FieldSelector,
}

/// Desired-state sets computed from one roster pass.
///
/// Sets are recreated on every pass, never mutated across cycles. An
/// identity is never in both sets: with conflicting rows the later row wins
/// and evicts the identity from the opposite set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSets {
    /// Identities with signed status declared true.
    pub allowed: BTreeSet<UserId>,
    /// Identities with signed status declared explicitly false.
    pub denied: BTreeSet<UserId>,
}

/// Classify the rows of a parsed roster for one scope.
///
/// Rows are skipped when the identity is not a valid numeric id, or when
/// scope filtering is configured and the row names a different scope. Rows
/// with an empty scope value apply to all scopes.
#[must_use]
pub fn classify(table: &Table, columns: &ColumnConfig, scope_id: &ScopeId) -> RosterSets {
    let mut sets = RosterSets::default();
    let scope_filtered = columns.scope.is_configured();

    for row in &table.rows {
        let raw_id = columns.identity.resolve(row, &table.header);
        if raw_id.is_empty() {
            continue;
        }
        let Ok(user) = raw_id.parse::<UserId>() else {
            debug!(value = raw_id, "ignoring non-numeric identity value");
            continue;
        };

        if scope_filtered {
            let row_scope = columns.scope.resolve(row, &table.header).trim();
            if !row_scope.is_empty() && row_scope != scope_id.as_str() {
                continue;
            }
        }

        match SignedStatus::classify(columns.signed.resolve(row, &table.header)) {
            SignedStatus::Signed => {
                sets.denied.remove(&user);
                sets.allowed.insert(user);
            }
            SignedStatus::NotSigned => {
                sets.allowed.remove(&user);
                sets.denied.insert(user);
            }
            SignedStatus::Unspecified => {}
        }
    }

    sets
}
