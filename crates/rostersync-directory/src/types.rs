//! Shared directory data types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ids::{GroupId, UserId};

/// A member of a scope, together with the groups it currently holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Directory identifier of the member.
    pub id: UserId,
    /// Groups currently granted to the member within the scope.
    #[serde(default)]
    pub groups: BTreeSet<GroupId>,
}

impl Member {
    /// Create a member with no groups.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            groups: BTreeSet::new(),
        }
    }

    /// Check whether the member currently holds a group.
    #[must_use]
    pub fn has_group(&self, group: &GroupId) -> bool {
        self.groups.contains(group)
    }
}

/// Selects the target group within a scope, by id or by display name.
///
/// When both are configured the id wins; name lookup is a fallback for
/// deployments that do not pin the group identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSelector {
    /// Group identifier, if known.
    #[serde(default)]
    pub id: Option<GroupId>,
    /// Group display name, matched exactly.
    #[serde(default)]
    pub name: Option<String>,
}

impl GroupSelector {
    /// Select by identifier.
    pub fn by_id(id: impl Into<GroupId>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    /// Select by display name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Whether either selector component is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.id.is_some() || self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

impl From<GroupId> for GroupSelector {
    fn from(id: GroupId) -> Self {
        Self::by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_group_check() {
        let mut member = Member::new("123".parse().unwrap());
        assert!(!member.has_group(&GroupId::new("g1")));
        member.groups.insert(GroupId::new("g1"));
        assert!(member.has_group(&GroupId::new("g1")));
    }

    #[test]
    fn group_selector_configuration() {
        assert!(!GroupSelector::default().is_configured());
        assert!(GroupSelector::by_id(GroupId::new("g1")).is_configured());
        assert!(GroupSelector::by_name("Members").is_configured());
        let empty_name = GroupSelector {
            id: None,
            name: Some(String::new()),
        };
        assert!(!empty_name.is_configured());
    }
}
