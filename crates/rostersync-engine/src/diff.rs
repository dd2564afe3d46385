//! Diff engine.
//!
//! Computes the add/remove/ban candidate lists from the desired sets, the
//! observation, and the policy switches. Candidate lists are independent:
//! the same identity may appear in both `to_remove` and `to_ban`
//! (revoke-then-ban is an accepted outcome). Lists are sorted for
//! deterministic output.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use rostersync_directory::{DirectoryClient, GroupId, ScopeId, UserId};
use rostersync_roster::RosterSets;

use crate::observer::Observation;
use crate::policy::SyncPolicy;

/// Candidate lists produced by one diff pass, prior to execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    /// Identities to grant the group to.
    pub to_add: Vec<UserId>,
    /// Identities to revoke the group from (deduplicated).
    pub to_remove: Vec<UserId>,
    /// Identities to ban from the scope.
    pub to_ban: Vec<UserId>,
}

impl SyncPlan {
    /// Whether the plan proposes no mutations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty() && self.to_ban.is_empty()
    }
}

/// Compute the mutation plan for one scope.
///
/// Membership probes that fail (member not fetchable, transport error) drop
/// the identity from the affected candidate list for this cycle; the next
/// cycle reattempts naturally.
pub async fn plan<D>(
    directory: &D,
    scope: &ScopeId,
    group: &GroupId,
    sets: &RosterSets,
    observation: &Observation,
    policy: &SyncPolicy,
) -> SyncPlan
where
    D: DirectoryClient + ?Sized,
{
    let mut to_add = Vec::new();

    // Adds are always confirmed per identity: the enumerated holder set can
    // be stale relative to the live directory, so consult the member cache
    // and fall back to a fresh fetch.
    for user in &sets.allowed {
        let cached = match observation {
            Observation::Full { members, .. } => members.get(user),
            Observation::Degraded => None,
        };
        let holds = match cached {
            Some(member) => Some(member.has_group(group)),
            None => match directory.fetch_member(scope, user).await {
                Ok(Some(member)) => Some(member.has_group(group)),
                Ok(None) => None,
                Err(e) => {
                    debug!(scope_id = %scope, user_id = %user, error = %e, "add probe failed");
                    None
                }
            },
        };
        if holds == Some(false) {
            to_add.push(user.clone());
        }
    }

    let mut to_remove = BTreeSet::new();

    if policy.remove_missing {
        match observation.holders() {
            Some(holders) => {
                for holder in holders {
                    if !sets.allowed.contains(holder) {
                        to_remove.insert(holder.clone());
                    }
                }
            }
            None => {
                warn!(
                    scope_id = %scope,
                    "remove_missing requires full membership enumeration; skipping removals of unlisted holders"
                );
            }
        }
    }

    if policy.remove_denied {
        match observation {
            // With full fidelity every denied identity is scheduled; the
            // revoke is a no-op for members without the group.
            Observation::Full { .. } => {
                to_remove.extend(sets.denied.iter().cloned());
            }
            // Degraded: only schedule identities confirmed to hold the group.
            Observation::Degraded => {
                for user in &sets.denied {
                    match directory.fetch_member(scope, user).await {
                        Ok(Some(member)) if member.has_group(group) => {
                            to_remove.insert(user.clone());
                        }
                        Ok(_) => {}
                        Err(e) => {
                            debug!(scope_id = %scope, user_id = %user, error = %e, "remove probe failed");
                        }
                    }
                }
            }
        }
    }

    let mut to_ban = BTreeSet::new();

    if policy.ban_non_signed {
        for user in &sets.denied {
            let present = match observation {
                Observation::Full { members, .. } => members.contains_key(user),
                Observation::Degraded => match directory.fetch_member(scope, user).await {
                    Ok(present) => present.is_some(),
                    Err(e) => {
                        debug!(scope_id = %scope, user_id = %user, error = %e, "ban probe failed");
                        false
                    }
                },
            };
            if present {
                to_ban.insert(user.clone());
            }
        }
    }

    SyncPlan {
        to_add,
        to_remove: to_remove.into_iter().collect(),
        to_ban: to_ban.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan() {
        assert!(SyncPlan::default().is_empty());
        let plan = SyncPlan {
            to_add: vec!["1".parse().unwrap()],
            ..SyncPlan::default()
        };
        assert!(!plan.is_empty());
    }
}
