// Boundary record operations: upsert at load time, scan/commit/reset for
// the reconciliation engine, export bookkeeping.

use idnb_core::{BoundaryRecord, Level, RawAttrs};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;

/// Outcome of an upsert during load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// One matched record ready for export: canonical identity plus geometry.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub fid: String,
    pub code: String,
    pub name: String,
    pub geometry: String,
}

const RECORD_COLUMNS: &str = "fid, level, p_code, p_name, r_code, r_name, \
     d_code, d_name, v_code, v_name, matched, matched_code, matched_at";

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<BoundaryRecord> {
    let level: String = row.get(1)?;
    let level = level.parse::<Level>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(BoundaryRecord {
        fid: row.get(0)?,
        level,
        attrs: RawAttrs {
            province_code: row.get(2)?,
            province_name: row.get(3)?,
            regency_code: row.get(4)?,
            regency_name: row.get(5)?,
            district_code: row.get(6)?,
            district_name: row.get(7)?,
            village_code: row.get(8)?,
            village_name: row.get(9)?,
        },
        matched: row.get(10)?,
        matched_code: row.get(11)?,
        matched_at: row.get(12)?,
    })
}

/// Look up one record by primary key.
pub fn get(
    conn: &Connection,
    level: Level,
    fid: &str,
) -> Result<Option<BoundaryRecord>, StoreError> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM boundaries WHERE fid = ?1 AND level = ?2"
    );
    let rec = conn
        .query_row(&sql, params![fid, level.as_str()], record_from_row)
        .optional()?;
    Ok(rec)
}

/// Insert a new record or refresh the attributes and geometry of an existing
/// one (bumping `updated_at`). Match state is never touched here.
pub fn upsert(
    conn: &Connection,
    level: Level,
    fid: &str,
    attrs: &RawAttrs,
    geometry: Option<&str>,
    now: &str,
) -> Result<Upsert, StoreError> {
    let updated = conn.execute(
        "UPDATE boundaries SET
             p_code = ?3, p_name = ?4, r_code = ?5, r_name = ?6,
             d_code = ?7, d_name = ?8, v_code = ?9, v_name = ?10,
             geometry = ?11, updated_at = ?12
         WHERE fid = ?1 AND level = ?2",
        params![
            fid,
            level.as_str(),
            attrs.province_code,
            attrs.province_name,
            attrs.regency_code,
            attrs.regency_name,
            attrs.district_code,
            attrs.district_name,
            attrs.village_code,
            attrs.village_name,
            geometry,
            now,
        ],
    )?;
    if updated > 0 {
        return Ok(Upsert::Updated);
    }

    conn.execute(
        "INSERT INTO boundaries (
             fid, level, p_code, p_name, r_code, r_name,
             d_code, d_name, v_code, v_name,
             geometry, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            fid,
            level.as_str(),
            attrs.province_code,
            attrs.province_name,
            attrs.regency_code,
            attrs.regency_name,
            attrs.district_code,
            attrs.district_name,
            attrs.village_code,
            attrs.village_name,
            geometry,
            now,
        ],
    )?;
    Ok(Upsert::Inserted)
}

/// Snapshot of every unmatched record at one level, ordered by fid.
///
/// Taken once at scan time; records inserted by another process mid-run are
/// picked up on the next run.
pub fn scan_unmatched(
    conn: &Connection,
    level: Level,
) -> Result<Vec<BoundaryRecord>, StoreError> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM boundaries \
         WHERE level = ?1 AND matched = 0 ORDER BY fid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([level.as_str()], record_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Persist a successful match for one record. Single-row update guarded by
/// the record's own primary key.
pub fn commit_match(
    conn: &Connection,
    level: Level,
    fid: &str,
    code: &str,
    now: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE boundaries SET matched = 1, matched_code = ?3, matched_at = ?4 \
         WHERE fid = ?1 AND level = ?2",
        params![fid, level.as_str(), code, now],
    )?;
    Ok(())
}

/// Force mode: clear all match state at one level. Returns rows cleared.
pub fn reset_matches(conn: &Connection, level: Level) -> Result<usize, StoreError> {
    let n = conn.execute(
        "UPDATE boundaries SET matched = 0, matched_code = NULL, matched_at = NULL \
         WHERE level = ?1",
        [level.as_str()],
    )?;
    Ok(n)
}

/// Matched records joined with their canonical area, geometry present.
pub fn matched_with_geometry(
    conn: &Connection,
    level: Level,
) -> Result<Vec<ExportRow>, StoreError> {
    let sql = format!(
        "SELECT b.fid, c.code, c.name, b.geometry \
         FROM boundaries b JOIN {} c ON c.code = b.matched_code \
         WHERE b.level = ?1 AND b.matched = 1 AND b.geometry IS NOT NULL \
         ORDER BY c.code",
        level.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([level.as_str()], |row| {
        Ok(ExportRow {
            fid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            geometry: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Stamp a record as exported.
pub fn stamp_exported(
    conn: &Connection,
    level: Level,
    fid: &str,
    now: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE boundaries SET exported_at = ?3 WHERE fid = ?1 AND level = ?2",
        params![fid, level.as_str(), now],
    )?;
    Ok(())
}

/// The matched set at one level: (fid, matched_code) pairs, ordered by fid.
pub fn matched_set(
    conn: &Connection,
    level: Level,
) -> Result<Vec<(String, String)>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT fid, matched_code FROM boundaries \
         WHERE level = ?1 AND matched = 1 ORDER BY fid",
    )?;
    let rows = stmt.query_map([level.as_str()], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Total number of records at one level.
pub fn count(conn: &Connection, level: Level) -> Result<i64, StoreError> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM boundaries WHERE level = ?1",
        [level.as_str()],
        |row| row.get(0),
    )?;
    Ok(n)
}
