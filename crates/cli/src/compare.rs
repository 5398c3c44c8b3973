//! `idnb compare` — diff a local export against the published boundary.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use idnb_core::Level;
use idnb_io::diff;
use idnb_sync::CancelToken;
use serde_json::Value;

use crate::CliError;

const UPSTREAM_BASE: &str =
    "https://raw.githubusercontent.com/fityannugroho/idn-area-boundary/refs/heads/main/data";

const FETCH_TIMEOUT_SECS: u64 = 30;

pub fn cmd_compare(
    level: Level,
    code: &str,
    data_dir: &Path,
    cancel: &CancelToken,
) -> Result<(), CliError> {
    let local_path = data_dir.join(level.table()).join(format!("{code}.geojson"));
    if !local_path.exists() {
        return Err(CliError::no_data(format!(
            "local boundary not found for {}/{code}.geojson",
            level.table()
        ))
        .with_hint(format!("run 'idnb export {}' first", level.table())));
    }

    // SIGINT before the fetch skips it; mid-fetch the timeout bounds the wait
    if cancel.load(Ordering::Relaxed) {
        println!("Comparison aborted");
        return Ok(());
    }

    let url = format!("{UPSTREAM_BASE}/{}/{code}.geojson", level.table());
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(|e| CliError::fetch(format!("cannot build HTTP client: {e}")))?;
    let response = client
        .get(&url)
        .send()
        .map_err(|e| CliError::fetch(format!("cannot fetch remote boundary: {e}")))?;
    if !response.status().is_success() {
        return Err(CliError::fetch(format!(
            "cannot fetch remote boundary for {}/{code}.geojson (status: {})",
            level.table(),
            response.status()
        )));
    }
    let body = response
        .text()
        .map_err(|e| CliError::fetch(format!("cannot read remote boundary: {e}")))?;
    let remote: Value = serde_json::from_str(&body)
        .map_err(|e| CliError::fetch(format!("remote boundary is not valid JSON: {e}")))?;

    let local: Value = serde_json::from_str(
        &std::fs::read_to_string(&local_path)
            .map_err(|e| CliError::general(format!("cannot read {}: {e}", local_path.display())))?,
    )
    .map_err(|e| CliError::general(format!("local boundary is not valid JSON: {e}")))?;

    if cancel.load(Ordering::Relaxed) {
        println!("Comparison aborted");
        return Ok(());
    }

    println!("Comparing {}/{code}.geojson...", level.table());
    let ops = diff::diff(&remote, &local);
    if ops.is_empty() {
        println!("{}/{code}.geojson is the same as the remote", level.table());
        return Ok(());
    }

    println!("Found {} differences", ops.len());
    let timestamp = chrono::Utc::now()
        .to_rfc3339()
        .replace([':', '.'], "-");
    let out_path = Path::new("diffs").join(format!(
        "{}_{code}_diff_{timestamp}.txt",
        level.table()
    ));
    std::fs::create_dir_all("diffs")
        .map_err(|e| CliError::general(format!("cannot create diffs directory: {e}")))?;
    std::fs::write(&out_path, diff::render(&ops))
        .map_err(|e| CliError::general(format!("cannot write {}: {e}", out_path.display())))?;
    println!("Diff output written to {}", out_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    #[test]
    fn pre_cancelled_compare_never_touches_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("regencies");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::write(local.join("31.75.geojson"), "{}").unwrap();

        let cancel: CancelToken = Arc::new(AtomicBool::new(true));
        // Succeeds without any remote fetch; an attempted fetch would either
        // hang on a dead network or produce real diff output.
        cmd_compare(Level::Regency, "31.75", dir.path(), &cancel).unwrap();
    }

    #[test]
    fn missing_local_export_is_a_prerequisite_error() {
        let dir = tempfile::tempdir().unwrap();
        let cancel: CancelToken = Arc::new(AtomicBool::new(false));
        let err = cmd_compare(Level::Regency, "31.75", dir.path(), &cancel).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_NO_DATA);
    }
}
