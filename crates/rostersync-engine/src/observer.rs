//! Actual-state observation.
//!
//! Obtains the current holder set of the target group in one of two fidelity
//! modes. The result is a tagged variant, not a flag: downstream logic
//! switches on [`Observation`] so a degraded cycle cannot accidentally
//! consult a holder set that does not exist.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use rostersync_directory::{DirectoryClient, GroupId, Member, ScopeId, UserId};

/// Result of observing a scope's membership.
#[derive(Debug, Clone)]
pub enum Observation {
    /// Bulk enumeration succeeded: the full member list and the derived
    /// holder set are known. The member map doubles as a probe cache during
    /// diffing.
    Full {
        /// Identities currently holding the target group.
        holders: BTreeSet<UserId>,
        /// All scope members, keyed by id.
        members: HashMap<UserId, Member>,
    },
    /// Bulk enumeration unavailable; only per-member probes are possible.
    /// Policies requiring the global holder set must be skipped.
    Degraded,
}

impl Observation {
    /// Whether full fidelity was achieved.
    #[must_use]
    pub fn is_full(&self) -> bool {
        matches!(self, Observation::Full { .. })
    }

    /// The holder set, when known.
    #[must_use]
    pub fn holders(&self) -> Option<&BTreeSet<UserId>> {
        match self {
            Observation::Full { holders, .. } => Some(holders),
            Observation::Degraded => None,
        }
    }
}

/// Observe the holders of `group` within `scope`.
///
/// With `high_fidelity` disabled the bulk path is not even attempted. When
/// the bulk enumeration fails or times out the cycle degrades rather than
/// failing: the error is logged and [`Observation::Degraded`] returned.
pub async fn observe<D>(
    directory: &D,
    scope: &ScopeId,
    group: &GroupId,
    high_fidelity: bool,
) -> Observation
where
    D: DirectoryClient + ?Sized,
{
    if !high_fidelity {
        debug!(scope_id = %scope, "high-fidelity observation disabled, using per-member probes");
        return Observation::Degraded;
    }

    match directory.list_members(scope).await {
        Ok(list) => {
            let mut holders = BTreeSet::new();
            let mut members = HashMap::with_capacity(list.len());
            for member in list {
                if member.has_group(group) {
                    holders.insert(member.id.clone());
                }
                members.insert(member.id.clone(), member);
            }
            debug!(
                scope_id = %scope,
                members = members.len(),
                holders = holders.len(),
                "observed scope membership"
            );
            Observation::Full { holders, members }
        }
        Err(e) => {
            warn!(
                scope_id = %scope,
                error = %e,
                "member enumeration failed, degrading to per-member probes"
            );
            Observation::Degraded
        }
    }
}
