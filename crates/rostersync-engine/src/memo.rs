//! Change-detection memo.
//!
//! Caches a fingerprint of the last successfully committed cycle per scope,
//! so a cycle whose policy-relevant inputs are unchanged can be skipped
//! without touching the directory. The memo is an explicit object injected
//! into the engine; entries live for the process lifetime and are only
//! overwritten, never deleted. A cycle with any operation failure leaves the
//! entry untouched (stale but safe), forcing the next cycle to re-evaluate.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use rostersync_directory::{ScopeId, UserId};
use rostersync_roster::RosterSets;

use crate::observer::Observation;
use crate::policy::SyncPolicy;

/// Canonical serialization of one cycle's input sets.
///
/// Components are sorted, comma-joined id lists used purely for equality
/// comparison; the holders component is absent for degraded cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    allowed: String,
    denied: String,
    holders: Option<String>,
}

fn join_sorted(ids: &BTreeSet<UserId>) -> String {
    ids.iter()
        .map(UserId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

impl Fingerprint {
    /// Compute the fingerprint for the current cycle's inputs.
    #[must_use]
    pub fn compute(sets: &RosterSets, observation: &Observation) -> Self {
        Self {
            allowed: join_sorted(&sets.allowed),
            denied: join_sorted(&sets.denied),
            holders: observation.holders().map(join_sorted),
        }
    }
}

/// Scope-keyed cache of last-committed cycle fingerprints.
#[derive(Debug, Default)]
pub struct SyncMemo {
    entries: Mutex<HashMap<ScopeId, Fingerprint>>,
}

impl SyncMemo {
    /// Create an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cycle can be skipped: every policy-relevant component of
    /// `current` matches the stored entry for `scope`.
    ///
    /// The allowed component always matters; denied only under a policy that
    /// acts on denied identities; holders only when the current observation
    /// achieved full fidelity. No stored entry always means "do not skip".
    #[must_use]
    pub fn should_skip(
        &self,
        scope: &ScopeId,
        current: &Fingerprint,
        policy: &SyncPolicy,
    ) -> bool {
        let entries = self.entries.lock().expect("memo lock poisoned");
        let Some(previous) = entries.get(scope) else {
            return false;
        };

        let same_allowed = previous.allowed == current.allowed;
        let same_denied = !policy.denied_matters() || previous.denied == current.denied;
        let same_holders = current.holders.is_none() || previous.holders == current.holders;

        same_allowed && same_denied && same_holders
    }

    /// Record the fingerprint of a committed, error-free cycle.
    pub fn commit(&self, scope: &ScopeId, fingerprint: Fingerprint) {
        let mut entries = self.entries.lock().expect("memo lock poisoned");
        entries.insert(scope.clone(), fingerprint);
    }
}
