//! `idnb-io` — File I/O for the boundary toolkit.
//!
//! GeoJSON feature source for loading raw boundary data, per-code Feature
//! export for matched records, and the structural JSON diff behind `compare`.
//! Geometry payloads pass through opaque; nothing here interprets them.

pub mod diff;
pub mod error;
pub mod geojson;

pub use error::IoError;
pub use geojson::{FeatureSource, GeoJsonSource, RawFeature};
