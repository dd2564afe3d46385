//! Bounded-concurrency mutation executor.
//!
//! Runs one operation per candidate identity under a fixed concurrency
//! ceiling. Workers share an atomic cursor over the candidate list, each
//! claiming the next unclaimed identity until the list is exhausted. Every
//! operation returns a tagged outcome; failures are collected, never
//! propagated, so one failing identity cannot abort its siblings. The
//! aggregate error flag is derived by reduction over the collected outcomes
//! after all workers have joined.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::error;

use rostersync_directory::UserId;

/// Outcome of a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpStatus {
    /// The mutation was applied and (where applicable) verified.
    Applied,
    /// Nothing to do for this identity (e.g. not a member of the scope).
    Skipped,
    /// The mutation or its verification failed.
    Failed(String),
}

/// Per-identity outcome record.
#[derive(Debug, Clone)]
pub struct OpOutcome {
    /// The identity the operation targeted.
    pub user: UserId,
    /// What happened.
    pub status: OpStatus,
}

/// Aggregate result of one batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Per-identity outcomes, one per candidate.
    pub outcomes: Vec<OpOutcome>,
    worker_panics: usize,
}

impl BatchOutcome {
    /// Number of operations applied successfully.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OpStatus::Applied)
            .count()
    }

    /// Whether any operation failed (including lost workers).
    #[must_use]
    pub fn had_errors(&self) -> bool {
        self.worker_panics > 0
            || self
                .outcomes
                .iter()
                .any(|o| matches!(o.status, OpStatus::Failed(_)))
    }
}

/// Run `op` for every id in `ids` with at most `concurrency` operations in
/// flight.
pub async fn execute<F, Fut>(ids: Vec<UserId>, concurrency: usize, op: F) -> BatchOutcome
where
    F: Fn(UserId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OpStatus> + Send + 'static,
{
    if ids.is_empty() {
        return BatchOutcome::default();
    }

    let ids = Arc::new(ids);
    let cursor = Arc::new(AtomicUsize::new(0));
    let op = Arc::new(op);
    let workers = concurrency.max(1).min(ids.len());

    let mut tasks: JoinSet<Vec<OpOutcome>> = JoinSet::new();
    for _ in 0..workers {
        let ids = Arc::clone(&ids);
        let cursor = Arc::clone(&cursor);
        let op = Arc::clone(&op);
        tasks.spawn(async move {
            let mut local = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(user) = ids.get(index) else {
                    break;
                };
                let status = op(user.clone()).await;
                local.push(OpOutcome {
                    user: user.clone(),
                    status,
                });
            }
            local
        });
    }

    let mut batch = BatchOutcome::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcomes) => batch.outcomes.extend(outcomes),
            Err(e) => {
                error!(error = %e, "executor worker lost");
                batch.worker_panics += 1;
            }
        }
    }
    batch
}
