//! # Reconciliation engine
//!
//! Converges actual group membership in a scope toward the desired state
//! declared by an external roster.
//!
//! Control flow per cycle:
//!
//! ```text
//! ┌──────────┐   ┌─────────────────────┐   ┌──────┐   ┌──────────┐
//! │ Observer │──►│ Roster fetch +      │──►│ Diff │──►│ Bounded  │
//! │ (2 modes)│   │ classify            │   │ +Memo│   │ executor │
//! └──────────┘   └─────────────────────┘   └──────┘   └────┬─────┘
//!                                                          │
//!                          memo commit (error-free cycles only)
//! ```
//!
//! - [`observer`] — obtains the holder set in high fidelity (bulk
//!   enumeration) or degrades to per-member probing,
//! - [`diff`] — computes add/remove/ban candidate lists under policy,
//! - [`memo`] — change-detection cache short-circuiting no-op cycles,
//! - [`executor`] — bounded-concurrency mutation runner with
//!   read-after-write verification,
//! - [`cycle`] — the per-scope orchestrator tying it together.

pub mod cycle;
pub mod diff;
pub mod error;
pub mod executor;
pub mod memo;
pub mod observer;
pub mod policy;

pub use cycle::{CycleReport, EngineConfig, SyncEngine};
pub use diff::SyncPlan;
pub use error::{EngineError, EngineResult};
pub use executor::{execute, BatchOutcome, OpOutcome, OpStatus};
pub use memo::{Fingerprint, SyncMemo};
pub use observer::{observe, Observation};
pub use policy::SyncPolicy;
