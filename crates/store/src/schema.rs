// Database schema and connection setup.
//
// The four canonical tables share one shape (code, name, parent_code) so the
// scoped candidate query can join them generically; provinces have no
// parent_code column. Boundary records are keyed by (fid, level).

use std::path::Path;

use rusqlite::Connection;

use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS provinces (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS regencies (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    parent_code TEXT NOT NULL REFERENCES provinces(code)
);

CREATE TABLE IF NOT EXISTS districts (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    parent_code TEXT NOT NULL REFERENCES regencies(code)
);

CREATE TABLE IF NOT EXISTS villages (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    parent_code TEXT NOT NULL REFERENCES districts(code)
);

CREATE TABLE IF NOT EXISTS boundaries (
    fid TEXT NOT NULL,
    level TEXT NOT NULL,          -- province | regency | district | village
    p_code TEXT,
    p_name TEXT,
    r_code TEXT,
    r_name TEXT,
    d_code TEXT,
    d_name TEXT,
    v_code TEXT,
    v_name TEXT,
    matched INTEGER NOT NULL DEFAULT 0,
    matched_code TEXT,
    matched_at TEXT,
    geometry TEXT,                -- opaque GeoJSON geometry, never interpreted
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    exported_at TEXT,
    PRIMARY KEY (fid, level)
);

CREATE INDEX IF NOT EXISTS idx_boundaries_level_matched
    ON boundaries (level, matched);
"#;

/// Open (or create) the store at `path` and apply the schema.
///
/// WAL mode + busy timeout allow one writer per worker connection during
/// a concurrent sync run.
pub fn open(path: &Path) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)?;
    // journal_mode returns the resulting mode as a row
    conn.query_row("PRAGMA journal_mode=WAL", [], |_row| Ok(()))?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

/// In-memory store with the schema applied. Test helper.
pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}
