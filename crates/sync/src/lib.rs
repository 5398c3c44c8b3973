//! `idnb-sync` — Boundary reconciliation engine.
//!
//! For each unmatched boundary record at a level, deterministically finds
//! the one canonical area code it corresponds to: exact-code lookup, then a
//! hierarchy-scoped fuzzy name query, then disambiguation. Runs as an
//! idempotent, resumable, cancellable bulk operation.
//!
//! Two drivers share the resolver:
//! - [`driver::run`] — per-record best-candidate policy, bounded worker pool;
//! - [`bulk::run`] — stricter set-based policy that only auto-matches
//!   globally unique 1:1 pairs.
//!
//! The two policies are not equivalent and are never mixed within one run.

pub mod bulk;
pub mod disambiguate;
pub mod driver;
pub mod error;
pub mod resolver;

pub use driver::{run, CancelToken, SyncConfig, SyncOutcome, SyncStats};
pub use error::SyncError;
