//! `idnb-core` — Core types for the boundary reconciliation toolkit.
//!
//! Pure types crate: administrative levels, canonical areas, and raw
//! boundary records. No storage or IO dependencies.

pub mod level;
pub mod model;

pub use level::{Level, ParseLevelError};
pub use model::{BoundaryRecord, CanonicalArea, MatchResult, RawAttrs};
