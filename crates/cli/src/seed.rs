//! `idnb seed` — load canonical reference data from CSV.

use std::path::Path;

use idnb_core::Level;
use idnb_store::seed;

use crate::CliError;

pub fn cmd_seed(db: &Path, dir: &Path) -> Result<(), CliError> {
    // Validate all four inputs up front; a partial reference set would make
    // later scoped joins silently miss.
    let mut inputs = Vec::new();
    for level in Level::ALL {
        let path = dir.join(format!("{}.csv", level.table()));
        if !path.exists() {
            return Err(CliError::usage(format!("missing seed file {}", path.display())));
        }
        inputs.push((level, path));
    }

    let conn = idnb_store::open(db).map_err(CliError::store)?;
    seed::clear_all(&conn).map_err(CliError::store)?;

    for (level, path) in inputs {
        let data = std::fs::read_to_string(&path)
            .map_err(|e| CliError::general(format!("cannot read {}: {e}", path.display())))?;
        let n = seed::seed_level(&conn, level, &data).map_err(CliError::store)?;
        println!("{n} {} seeded", level.table());
    }

    Ok(())
}
