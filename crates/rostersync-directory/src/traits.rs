//! Directory client trait
//!
//! The capability set the reconciliation engine needs from the target
//! directory. Every call may fail independently; failures are local to the
//! calling operation and classified by [`DirectoryError::is_transient`].
//!
//! [`DirectoryError::is_transient`]: crate::error::DirectoryError::is_transient

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::ids::{GroupId, ScopeId, UserId};
use crate::types::{GroupSelector, Member};

/// Client for the target directory.
///
/// Implementations are expected to perform fresh reads for the probe methods
/// (`fetch_member`, `member_has_group`); the engine relies on them for
/// read-after-write verification of mutations.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Enumerate the scopes this client can reconcile.
    async fn list_scopes(&self) -> DirectoryResult<Vec<ScopeId>>;

    /// Resolve the target group within a scope.
    ///
    /// Returns [`DirectoryError::GroupNotFound`] when neither the id nor the
    /// name matches an existing group.
    ///
    /// [`DirectoryError::GroupNotFound`]: crate::error::DirectoryError::GroupNotFound
    async fn resolve_group(
        &self,
        scope: &ScopeId,
        selector: &GroupSelector,
    ) -> DirectoryResult<GroupId>;

    /// Bulk-enumerate the members of a scope with their group holdings.
    ///
    /// This is the high-fidelity observation path; it may be unavailable or
    /// time out, in which case the engine degrades to per-member probes.
    async fn list_members(&self, scope: &ScopeId) -> DirectoryResult<Vec<Member>>;

    /// Fetch a single member, or `None` when not present in the scope.
    async fn fetch_member(
        &self,
        scope: &ScopeId,
        user: &UserId,
    ) -> DirectoryResult<Option<Member>>;

    /// Probe whether a member currently holds a group (fresh read).
    async fn member_has_group(
        &self,
        scope: &ScopeId,
        user: &UserId,
        group: &GroupId,
    ) -> DirectoryResult<bool>;

    /// Grant a group to a member.
    async fn grant_group(
        &self,
        scope: &ScopeId,
        user: &UserId,
        group: &GroupId,
        reason: &str,
    ) -> DirectoryResult<()>;

    /// Revoke a group from a member. Revoking a group the member does not
    /// hold is a no-op, not an error.
    async fn revoke_group(
        &self,
        scope: &ScopeId,
        user: &UserId,
        group: &GroupId,
        reason: &str,
    ) -> DirectoryResult<()>;

    /// Ban a member from the scope.
    async fn ban_member(
        &self,
        scope: &ScopeId,
        user: &UserId,
        reason: &str,
    ) -> DirectoryResult<()>;
}
