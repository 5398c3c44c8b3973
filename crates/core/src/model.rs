use serde::{Deserialize, Serialize};

use crate::level::Level;

// ---------------------------------------------------------------------------
// Canonical reference data
// ---------------------------------------------------------------------------

/// An authoritative area at one level of the hierarchy.
///
/// `parent_code` is `None` only for provinces; every other area references
/// an existing area at the immediate parent level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalArea {
    pub code: String,
    pub name: String,
    pub parent_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Raw boundary records
// ---------------------------------------------------------------------------

/// Unvalidated attribute strings carried by a source feature.
///
/// A feature at level L carries its own raw code/name plus the raw names of
/// every ancestor level; fields for deeper levels stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttrs {
    pub province_code: Option<String>,
    pub province_name: Option<String>,
    pub regency_code: Option<String>,
    pub regency_name: Option<String>,
    pub district_code: Option<String>,
    pub district_name: Option<String>,
    pub village_code: Option<String>,
    pub village_name: Option<String>,
}

impl RawAttrs {
    /// Raw code field for the given level.
    pub fn code_for(&self, level: Level) -> Option<&str> {
        match level {
            Level::Province => self.province_code.as_deref(),
            Level::Regency => self.regency_code.as_deref(),
            Level::District => self.district_code.as_deref(),
            Level::Village => self.village_code.as_deref(),
        }
    }

    /// Raw name field for the given level.
    pub fn name_for(&self, level: Level) -> Option<&str> {
        match level {
            Level::Province => self.province_name.as_deref(),
            Level::Regency => self.regency_name.as_deref(),
            Level::District => self.district_name.as_deref(),
            Level::Village => self.village_name.as_deref(),
        }
    }
}

/// A geometry-bearing record imported from the raw dataset.
///
/// Keyed by `(fid, level)`; `fid` is stable across runs. The reconciliation
/// engine only ever mutates `matched`, `matched_code`, and `matched_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryRecord {
    pub fid: String,
    pub level: Level,
    pub attrs: RawAttrs,
    pub matched: bool,
    pub matched_code: Option<String>,
    pub matched_at: Option<String>,
}

impl BoundaryRecord {
    /// The record's own raw code.
    pub fn raw_code(&self) -> Option<&str> {
        self.attrs.code_for(self.level)
    }

    /// The record's own raw name.
    pub fn raw_name(&self) -> Option<&str> {
        self.attrs.name_for(self.level)
    }

    /// Raw ancestor names, province first, one entry per ancestor level.
    pub fn parent_raw_names(&self) -> Vec<Option<&str>> {
        self.level
            .ancestors()
            .iter()
            .map(|a| self.attrs.name_for(*a))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Resolution output
// ---------------------------------------------------------------------------

/// Transient output of resolve + disambiguate for one record.
/// Consumed immediately by the driver; never persisted as its own entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub fid: String,
    pub resolved_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn village_record() -> BoundaryRecord {
        BoundaryRecord {
            fid: "101".into(),
            level: Level::Village,
            attrs: RawAttrs {
                province_name: Some("DKI JAKARTA".into()),
                regency_name: Some("JAKARTA TIMUR".into()),
                district_name: Some("MAKASAR".into()),
                village_code: Some("3175020003".into()),
                village_name: Some("KEBON PALA".into()),
                ..RawAttrs::default()
            },
            matched: false,
            matched_code: None,
            matched_at: None,
        }
    }

    #[test]
    fn raw_accessors_follow_level() {
        let rec = village_record();
        assert_eq!(rec.raw_code(), Some("3175020003"));
        assert_eq!(rec.raw_name(), Some("KEBON PALA"));
    }

    #[test]
    fn parent_raw_names_province_first() {
        let rec = village_record();
        assert_eq!(
            rec.parent_raw_names(),
            vec![Some("DKI JAKARTA"), Some("JAKARTA TIMUR"), Some("MAKASAR")]
        );
    }

    #[test]
    fn province_record_has_no_parents() {
        let rec = BoundaryRecord {
            fid: "1".into(),
            level: Level::Province,
            attrs: RawAttrs { province_name: Some("ACEH".into()), ..RawAttrs::default() },
            matched: false,
            matched_code: None,
            matched_at: None,
        };
        assert!(rec.parent_raw_names().is_empty());
    }
}
