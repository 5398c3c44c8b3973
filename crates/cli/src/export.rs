//! `idnb export` — write matched boundaries as per-code GeoJSON Features.

use std::path::Path;
use std::sync::atomic::Ordering;

use idnb_core::Level;
use idnb_io::geojson;
use idnb_store::boundaries;
use idnb_sync::CancelToken;

use crate::progress::Progress;
use crate::CliError;

pub fn cmd_export(
    db: &Path,
    level: Level,
    out: &Path,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let conn = idnb_store::open(db).map_err(CliError::store)?;
    let rows = boundaries::matched_with_geometry(&conn, level).map_err(CliError::store)?;

    if rows.is_empty() {
        return Err(CliError::no_data(format!("no matched {level} boundaries found"))
            .with_hint(format!("run 'idnb sync {}' first", level.table())));
    }

    println!("Exporting {} {level} boundaries...", rows.len());
    let bar = Progress::new(rows.len() as u64, level.as_str());
    let dir = out.join(level.table());
    let mut exported = 0usize;

    for row in &rows {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        geojson::write_feature(&dir, &row.code, &row.name, &row.geometry)
            .map_err(|e| CliError::general(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();
        boundaries::stamp_exported(&conn, level, &row.fid, &now).map_err(CliError::store)?;
        exported += 1;
        bar.inc();
    }
    bar.finish();

    println!("{exported} {level} boundaries exported");
    Ok(())
}
