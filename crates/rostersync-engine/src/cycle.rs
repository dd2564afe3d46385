//! Per-scope reconciliation cycle orchestrator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rostersync_directory::{
    DirectoryClient, DirectoryError, GroupId, GroupSelector, ScopeId, UserId,
};
use rostersync_roster::{classify, parse, ColumnConfig, RosterSource};

use crate::diff;
use crate::error::{EngineError, EngineResult};
use crate::executor::{self, BatchOutcome, OpStatus};
use crate::memo::{Fingerprint, SyncMemo};
use crate::observer::observe;
use crate::policy::SyncPolicy;

/// Static configuration of the reconciliation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Target group selector.
    pub group: GroupSelector,
    /// Roster column selectors.
    #[serde(default)]
    pub columns: ColumnConfig,
    /// Policy switches.
    #[serde(default)]
    pub policy: SyncPolicy,
    /// Attempt bulk membership enumeration (high-fidelity observation).
    #[serde(default = "default_high_fidelity")]
    pub high_fidelity: bool,
    /// Concurrency ceiling for mutation execution.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_high_fidelity() -> bool {
    true
}

fn default_concurrency() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            group: GroupSelector::default(),
            columns: ColumnConfig::default(),
            policy: SyncPolicy::default(),
            high_fidelity: default_high_fidelity(),
            concurrency: default_concurrency(),
        }
    }
}

/// Structured result of one reconciliation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// The scope this cycle reconciled.
    pub scope_id: ScopeId,
    /// Grants applied and verified.
    pub added: usize,
    /// Revocations applied and verified.
    pub removed: usize,
    /// Bans applied.
    pub banned: usize,
    /// Grant candidates.
    pub to_add: Vec<UserId>,
    /// Revocation candidates.
    pub to_remove: Vec<UserId>,
    /// Ban candidates.
    pub to_ban: Vec<UserId>,
    /// The cycle was short-circuited by the change-detection memo.
    pub skipped: bool,
    /// No mutations were executed (candidates only).
    pub dry_run: bool,
    /// At least one operation or verification failed.
    pub had_errors: bool,
    /// Observation fell back to per-member probing.
    pub degraded: bool,
}

impl CycleReport {
    fn skipped(scope_id: ScopeId, degraded: bool) -> Self {
        Self {
            scope_id,
            added: 0,
            removed: 0,
            banned: 0,
            to_add: Vec::new(),
            to_remove: Vec::new(),
            to_ban: Vec::new(),
            skipped: true,
            dry_run: false,
            had_errors: false,
            degraded,
        }
    }
}

/// Reconciliation engine for one target group.
///
/// Holds the collaborators as injected dependencies; the memo in particular
/// is shared state owned by the caller, so skip behavior is testable without
/// process-global maps.
pub struct SyncEngine<D, R>
where
    D: DirectoryClient + 'static,
    R: RosterSource,
{
    directory: Arc<D>,
    roster: Arc<R>,
    memo: Arc<SyncMemo>,
    config: EngineConfig,
}

impl<D, R> SyncEngine<D, R>
where
    D: DirectoryClient + 'static,
    R: RosterSource,
{
    /// Create a new engine.
    pub fn new(directory: Arc<D>, roster: Arc<R>, memo: Arc<SyncMemo>, config: EngineConfig) -> Self {
        Self {
            directory,
            roster,
            memo,
            config,
        }
    }

    /// Access the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one reconciliation cycle for `scope`.
    ///
    /// With `dry_run` set, the full observe/classify/diff pipeline runs but
    /// no mutation is executed and the memo is not consulted for skipping
    /// nor updated; the report carries the candidate lists with zero counts.
    pub async fn sync_scope(&self, scope: &ScopeId, dry_run: bool) -> EngineResult<CycleReport> {
        if !self.config.group.is_configured() {
            return Err(EngineError::configuration("target group is not configured"));
        }

        let group = match self.directory.resolve_group(scope, &self.config.group).await {
            Ok(group) => group,
            Err(DirectoryError::GroupNotFound { scope_id }) => {
                return Err(EngineError::configuration(format!(
                    "target group not found in scope {scope_id}"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let observation = observe(
            self.directory.as_ref(),
            scope,
            &group,
            self.config.high_fidelity,
        )
        .await;
        let degraded = !observation.is_full();

        let text = self.roster.fetch().await?;
        let table = parse(&text);
        let sets = classify(&table, &self.config.columns, scope);

        debug!(
            scope_id = %scope,
            allowed = sets.allowed.len(),
            denied = sets.denied.len(),
            degraded = degraded,
            "classified roster"
        );

        let fingerprint = Fingerprint::compute(&sets, &observation);
        if !dry_run && self.memo.should_skip(scope, &fingerprint, &self.config.policy) {
            debug!(scope_id = %scope, "inputs unchanged since last committed cycle, skipping");
            return Ok(CycleReport::skipped(scope.clone(), degraded));
        }

        let plan = diff::plan(
            self.directory.as_ref(),
            scope,
            &group,
            &sets,
            &observation,
            &self.config.policy,
        )
        .await;

        debug!(
            scope_id = %scope,
            to_add = plan.to_add.len(),
            to_remove = plan.to_remove.len(),
            to_ban = plan.to_ban.len(),
            "computed mutation plan"
        );

        if dry_run {
            return Ok(CycleReport {
                scope_id: scope.clone(),
                added: 0,
                removed: 0,
                banned: 0,
                to_add: plan.to_add,
                to_remove: plan.to_remove,
                to_ban: plan.to_ban,
                skipped: false,
                dry_run: true,
                had_errors: false,
                degraded,
            });
        }

        let adds = self
            .run_phase(&plan.to_add, scope, &group, Phase::Grant)
            .await;
        let removes = self
            .run_phase(&plan.to_remove, scope, &group, Phase::Revoke)
            .await;
        let bans = self.run_phase(&plan.to_ban, scope, &group, Phase::Ban).await;

        let had_errors = adds.had_errors() || removes.had_errors() || bans.had_errors();

        // A failed operation leaves the memo stale so the next cycle
        // re-evaluates instead of wrongly skipping.
        if !had_errors {
            self.memo.commit(scope, fingerprint);
        }

        let report = CycleReport {
            scope_id: scope.clone(),
            added: adds.applied(),
            removed: removes.applied(),
            banned: bans.applied(),
            to_add: plan.to_add,
            to_remove: plan.to_remove,
            to_ban: plan.to_ban,
            skipped: false,
            dry_run: false,
            had_errors,
            degraded,
        };

        info!(
            scope_id = %scope,
            added = report.added,
            removed = report.removed,
            banned = report.banned,
            had_errors = report.had_errors,
            "reconciliation cycle complete"
        );

        Ok(report)
    }

    async fn run_phase(
        &self,
        ids: &[UserId],
        scope: &ScopeId,
        group: &GroupId,
        phase: Phase,
    ) -> BatchOutcome {
        let directory = Arc::clone(&self.directory);
        let scope = scope.clone();
        let group = group.clone();
        let ban_reason = self.config.policy.ban_reason.clone();

        executor::execute(ids.to_vec(), self.config.concurrency, move |user| {
            let directory = Arc::clone(&directory);
            let scope = scope.clone();
            let group = group.clone();
            let ban_reason = ban_reason.clone();
            async move {
                match phase {
                    Phase::Grant => {
                        grant_with_verify(directory.as_ref(), &scope, &user, &group).await
                    }
                    Phase::Revoke => {
                        revoke_with_verify(directory.as_ref(), &scope, &user, &group).await
                    }
                    Phase::Ban => ban(directory.as_ref(), &scope, &user, &ban_reason).await,
                }
            }
        })
        .await
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Grant,
    Revoke,
    Ban,
}

/// Grant the group and confirm the effect with a fresh probe.
///
/// A mutation acknowledgment without observable effect is not trusted: the
/// probe must see the group, otherwise the operation counts as failed.
async fn grant_with_verify<D>(
    directory: &D,
    scope: &ScopeId,
    user: &UserId,
    group: &GroupId,
) -> OpStatus
where
    D: DirectoryClient + ?Sized,
{
    match directory.fetch_member(scope, user).await {
        Ok(Some(_)) => {}
        Ok(None) => return OpStatus::Skipped,
        Err(e) => {
            debug!(scope_id = %scope, user_id = %user, error = %e, "grant target not fetchable");
            return OpStatus::Skipped;
        }
    }

    debug!(scope_id = %scope, user_id = %user, group_id = %group, "granting group");
    if let Err(e) = directory.grant_group(scope, user, group, "signed (roster sync)").await {
        warn!(scope_id = %scope, user_id = %user, error = %e, "grant failed");
        return OpStatus::Failed(e.to_string());
    }

    match directory.member_has_group(scope, user, group).await {
        Ok(true) => OpStatus::Applied,
        Ok(false) => {
            warn!(scope_id = %scope, user_id = %user, "verify failed: group not present after grant");
            OpStatus::Failed("group not present after grant".to_string())
        }
        Err(e) => {
            warn!(scope_id = %scope, user_id = %user, error = %e, "grant verification errored");
            OpStatus::Failed(e.to_string())
        }
    }
}

/// Revoke the group and confirm the effect with a fresh probe.
async fn revoke_with_verify<D>(
    directory: &D,
    scope: &ScopeId,
    user: &UserId,
    group: &GroupId,
) -> OpStatus
where
    D: DirectoryClient + ?Sized,
{
    match directory.fetch_member(scope, user).await {
        Ok(Some(_)) => {}
        Ok(None) => return OpStatus::Skipped,
        Err(e) => {
            debug!(scope_id = %scope, user_id = %user, error = %e, "revoke target not fetchable");
            return OpStatus::Skipped;
        }
    }

    debug!(scope_id = %scope, user_id = %user, group_id = %group, "revoking group");
    if let Err(e) = directory
        .revoke_group(scope, user, group, "not signed (roster sync)")
        .await
    {
        warn!(scope_id = %scope, user_id = %user, error = %e, "revoke failed");
        return OpStatus::Failed(e.to_string());
    }

    match directory.member_has_group(scope, user, group).await {
        Ok(false) => OpStatus::Applied,
        Ok(true) => {
            warn!(scope_id = %scope, user_id = %user, "verify failed: group still present after revoke");
            OpStatus::Failed("group still present after revoke".to_string())
        }
        Err(e) => {
            warn!(scope_id = %scope, user_id = %user, error = %e, "revoke verification errored");
            OpStatus::Failed(e.to_string())
        }
    }
}

/// Ban a member. The call's own result is the only signal; there is no
/// post-condition probe for bans.
async fn ban<D>(directory: &D, scope: &ScopeId, user: &UserId, reason: &str) -> OpStatus
where
    D: DirectoryClient + ?Sized,
{
    debug!(scope_id = %scope, user_id = %user, "banning member");
    match directory.ban_member(scope, user, reason).await {
        Ok(()) => OpStatus::Applied,
        Err(e) => {
            warn!(scope_id = %scope, user_id = %user, error = %e, "ban failed");
            OpStatus::Failed(e.to_string())
        }
    }
}
