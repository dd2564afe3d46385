//! # Roster ingestion
//!
//! Turns the externally maintained roster document into the desired-state
//! sets the reconciliation engine converges toward:
//!
//! - [`parser`] — permissive tabular parser (header + row arrays),
//! - [`selector`] — logical-field to column resolution by name or index,
//! - [`classifier`] — allowed/denied set computation with scope filtering
//!   and identity validation,
//! - [`source`] — the [`RosterSource`] fetch contract and its HTTP
//!   implementation.

pub mod classifier;
pub mod error;
pub mod parser;
pub mod selector;
pub mod source;

pub use classifier::{classify, ColumnConfig, RosterSets, SignedStatus};
pub use error::{RosterError, RosterResult};
pub use parser::{parse, Table};
pub use selector::FieldSelector;
pub use source::{HttpRosterSource, RosterSource};
