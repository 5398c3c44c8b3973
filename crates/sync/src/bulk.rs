// Set-based reconciliation variant.
//
// Instead of resolving per record, each pass maps the whole unmatched set at
// once and only commits 1:1 pairs: a canonical code hit by exactly one
// record, from a record with exactly one candidate. A canonical area hit by
// more than one record in a pass is ambiguous and skipped entirely for that
// pass. Strictly more conservative than the per-record driver; the two
// policies are never mixed within one run.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::Ordering;

use idnb_core::{BoundaryRecord, Level};
use idnb_store::{areas, boundaries};
use rusqlite::Connection;

use crate::driver::{CancelToken, ProgressFn, SyncConfig, SyncOutcome, SyncStats};
use crate::error::SyncError;

/// Reconcile one level with the set-based 1:1 policy.
///
/// Pass 1 maps raw codes to canonical codes; pass 2 maps raw names over the
/// remainder, with pass-1 winners excluded from the candidate pool.
/// Cancellation is observed between records while mapping and before each
/// pass commits; a cancelled pass commits nothing.
pub fn run(
    db_path: &Path,
    level: Level,
    config: &SyncConfig,
    cancel: &CancelToken,
    progress: ProgressFn<'_>,
) -> Result<SyncOutcome, SyncError> {
    let conn = idnb_store::open(db_path)?;

    if areas::count(&conn, level)? == 0 {
        return Err(SyncError::EmptyReference(level));
    }

    if config.force {
        boundaries::reset_matches(&conn, level)?;
    }

    let records = boundaries::scan_unmatched(&conn, level)?;
    let total = records.len();
    let mut stats = SyncStats { scanned: total, ..SyncStats::default() };
    if total == 0 {
        return Ok(SyncOutcome::Completed(stats));
    }

    // Pass 1: exact code mapping.
    let mut code_pairs: BTreeMap<String, Vec<&BoundaryRecord>> = BTreeMap::new();
    for record in &records {
        if cancel.load(Ordering::Relaxed) {
            return Ok(SyncOutcome::Cancelled(stats));
        }
        let Some(raw_code) = record.raw_code() else { continue };
        if let Some(area) = areas::find_by_code(&conn, level, raw_code)? {
            code_pairs.entry(area.code).or_default().push(record);
        }
    }
    let code_winners: Vec<(&BoundaryRecord, String)> = code_pairs
        .into_iter()
        .filter(|(_, recs)| recs.len() == 1)
        .map(|(code, recs)| (recs[0], code))
        .collect();

    if cancel.load(Ordering::Relaxed) {
        return Ok(SyncOutcome::Cancelled(stats));
    }
    commit_pass(&conn, level, &code_winners, &mut stats, total, progress)?;

    let taken_fids: Vec<&str> = code_winners.iter().map(|(r, _)| r.fid.as_str()).collect();
    let taken_codes: Vec<&str> = code_winners.iter().map(|(_, c)| c.as_str()).collect();

    // Pass 2: scoped name mapping over the remainder. Code-pass results are
    // excluded from the candidate pool on both sides.
    let mut name_pairs: BTreeMap<String, Vec<&BoundaryRecord>> = BTreeMap::new();
    for record in &records {
        if cancel.load(Ordering::Relaxed) {
            return Ok(SyncOutcome::Cancelled(stats));
        }
        if taken_fids.contains(&record.fid.as_str()) {
            continue;
        }
        let candidates = name_candidates(&conn, record)?;
        // Strict 1:1: a record with several plausible areas is ambiguous
        let [candidate] = candidates.as_slice() else { continue };
        if taken_codes.contains(&candidate.code.as_str()) {
            continue;
        }
        name_pairs
            .entry(candidate.code.clone())
            .or_default()
            .push(record);
    }
    let name_winners: Vec<(&BoundaryRecord, String)> = name_pairs
        .into_iter()
        .filter(|(_, recs)| recs.len() == 1)
        .map(|(code, recs)| (recs[0], code))
        .collect();

    if cancel.load(Ordering::Relaxed) {
        return Ok(SyncOutcome::Cancelled(stats));
    }
    commit_pass(&conn, level, &name_winners, &mut stats, total, progress)?;

    stats.completed = total;
    Ok(SyncOutcome::Completed(stats))
}

/// Name-pass candidates only (no code pass), matching the per-record
/// resolver's scoping rules.
fn name_candidates(
    conn: &Connection,
    record: &BoundaryRecord,
) -> Result<Vec<idnb_core::CanonicalArea>, SyncError> {
    if record.level == Level::Province {
        let Some(name) = record.raw_name() else {
            return Ok(Vec::new());
        };
        let hit = areas::find_by_name_prefix(conn, Level::Province, name)?;
        Ok(hit.into_iter().collect())
    } else {
        Ok(areas::find_candidates(
            conn,
            record.level,
            record.raw_name(),
            &record.parent_raw_names(),
        )?)
    }
}

fn commit_pass(
    conn: &Connection,
    level: Level,
    winners: &[(&BoundaryRecord, String)],
    stats: &mut SyncStats,
    total: usize,
    progress: ProgressFn<'_>,
) -> Result<(), SyncError> {
    if winners.is_empty() {
        return Ok(());
    }
    conn.execute("BEGIN TRANSACTION", [])
        .map_err(idnb_store::StoreError::from)?;
    let now = chrono::Utc::now().to_rfc3339();
    for (record, code) in winners {
        if let Err(e) = boundaries::commit_match(conn, level, &record.fid, code, &now) {
            let _ = conn.execute("ROLLBACK", []);
            return Err(e.into());
        }
    }
    conn.execute("COMMIT", [])
        .map_err(idnb_store::StoreError::from)?;

    for _ in winners {
        stats.matched += 1;
        stats.completed += 1;
        progress(stats.completed, total);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Driver-level behavior is covered in tests/integration.rs; the unit
    // tests here pin the grouping policy itself.

    #[test]
    fn one_to_one_filter_drops_shared_codes() {
        let mut pairs: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        pairs.entry("31.75".into()).or_default().extend([1, 2]);
        pairs.entry("31.71".into()).or_default().push(3);
        let winners: Vec<_> = pairs
            .into_iter()
            .filter(|(_, recs)| recs.len() == 1)
            .collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].0, "31.71");
    }
}
