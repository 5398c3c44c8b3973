//! `idnb-store` — SQLite-backed tabular store.
//!
//! Holds the canonical reference hierarchy (one table per level, read-only
//! for the reconciliation engine) and the `boundaries` table of raw
//! geometry-bearing records. All name comparison is case-insensitive.

pub mod areas;
pub mod boundaries;
pub mod error;
pub mod schema;
pub mod seed;

pub use error::StoreError;
pub use schema::{open, open_memory};
