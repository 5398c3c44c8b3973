//! `idnb load` — import raw boundary features for one level.

use std::path::Path;
use std::sync::atomic::Ordering;

use idnb_core::Level;
use idnb_io::{FeatureSource, GeoJsonSource};
use idnb_store::boundaries::{self, Upsert};
use idnb_sync::CancelToken;

use crate::CliError;

pub fn cmd_load(
    db: &Path,
    level: Level,
    file: &Path,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    if !file.exists() {
        return Err(CliError::no_data(format!(
            "raw data for {level} does not exist at {}",
            file.display()
        ))
        .with_hint("add the raw data file first"));
    }

    let conn = idnb_store::open(db).map_err(CliError::store)?;
    let mut source =
        GeoJsonSource::open(file).map_err(|e| CliError::general(e.to_string()))?;

    let mut inserted = 0usize;
    let mut updated = 0usize;

    while let Some(feature) = source
        .next_feature()
        .map_err(|e| CliError::general(e.to_string()))?
    {
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        let attrs = feature.attrs(level);
        let geometry = if feature.geometry.is_null() {
            None
        } else {
            Some(feature.geometry.to_string())
        };
        let now = chrono::Utc::now().to_rfc3339();
        let outcome = boundaries::upsert(
            &conn,
            level,
            &feature.fid,
            &attrs,
            geometry.as_deref(),
            &now,
        )
        .map_err(CliError::store)?;

        match outcome {
            Upsert::Inserted => {
                inserted += 1;
                println!("{level} {} inserted", feature.fid);
            }
            Upsert::Updated => {
                updated += 1;
                println!("{level} {} updated", feature.fid);
            }
        }
    }

    println!("{inserted} inserted, {updated} updated");
    Ok(())
}
