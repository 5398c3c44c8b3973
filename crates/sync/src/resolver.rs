// Candidate resolution for one record: code pass, then scoped name pass.
//
// Raw shapefile attributes are inconsistently formatted (truncated names,
// missing diacritics, alternate codes), so code and name evidence are both
// tried and the union handed to the disambiguator.

use idnb_core::{BoundaryRecord, CanonicalArea, Level, MatchResult};
use idnb_store::{areas, StoreError};
use rusqlite::Connection;

use crate::disambiguate;

/// Ordered candidate list for one unmatched record: code-pass hit first,
/// then scoped name-pass hits in code order, de-duplicated by code.
pub fn resolve_candidates(
    conn: &Connection,
    record: &BoundaryRecord,
) -> Result<Vec<CanonicalArea>, StoreError> {
    let mut out: Vec<CanonicalArea> = Vec::new();

    // Code pass. Unscoped by parent: an unambiguous code match is
    // authoritative on its own.
    if let Some(code) = record.raw_code() {
        if let Some(area) = areas::find_by_code(conn, record.level, code)? {
            out.push(area);
        }
    }

    // Name pass. Provinces have no ancestor chain, so they take the
    // single-best name-prefix path; every other level runs the scoped
    // join against the full raw ancestor-name chain.
    if record.level == Level::Province {
        if let Some(name) = record.raw_name() {
            if let Some(area) = areas::find_by_name_prefix(conn, Level::Province, name)? {
                push_unique(&mut out, area);
            }
        }
    } else {
        let hits = areas::find_candidates(
            conn,
            record.level,
            record.raw_name(),
            &record.parent_raw_names(),
        )?;
        for area in hits {
            push_unique(&mut out, area);
        }
    }

    Ok(out)
}

/// Resolve + disambiguate one record to at most one canonical code.
pub fn resolve_one(
    conn: &Connection,
    record: &BoundaryRecord,
) -> Result<MatchResult, StoreError> {
    let candidates = resolve_candidates(conn, record)?;
    Ok(MatchResult {
        fid: record.fid.clone(),
        resolved_code: disambiguate::pick(&candidates, record.raw_code(), record.raw_name()),
    })
}

fn push_unique(out: &mut Vec<CanonicalArea>, area: CanonicalArea) {
    if !out.iter().any(|a| a.code == area.code) {
        out.push(area);
    }
}
