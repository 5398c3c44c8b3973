//! `idnb sync` — reconcile unmatched boundary records.

use std::path::Path;

use idnb_core::Level;
use idnb_sync::{bulk, driver, SyncConfig, SyncError, SyncOutcome};

use crate::progress::Progress;
use crate::CliError;

pub fn cmd_sync(
    db: &Path,
    level: Level,
    force: bool,
    use_bulk: bool,
    concurrency: usize,
    cancel: &idnb_sync::CancelToken,
) -> Result<(), CliError> {
    if concurrency == 0 {
        return Err(CliError::usage("--concurrency must be at least 1"));
    }

    let config = SyncConfig { concurrency, force };
    let verb = if force { "Force syncing" } else { "Syncing" };
    println!("{verb} {level} boundaries...");

    let bar = Progress::deferred(level.as_str());
    let progress = |_done: usize, total: usize| {
        bar.ensure_length(total as u64);
        bar.inc();
    };

    let run = if use_bulk { bulk::run } else { driver::run };
    let outcome = run(db, level, &config, cancel, &progress);
    bar.finish();

    let outcome = outcome.map_err(|e| match e {
        SyncError::EmptyReference(_) => CliError::no_data(e.to_string()),
        SyncError::Store(_) => CliError::store(e),
    })?;

    match outcome {
        SyncOutcome::Completed(stats) if stats.scanned == 0 => {
            println!("No {level} boundaries to sync");
        }
        SyncOutcome::Completed(stats) => {
            println!("Synced {} of {} {level} boundaries", stats.matched, stats.scanned);
        }
        SyncOutcome::Cancelled(stats) => {
            println!(
                "Cancelled after {} of {} {level} boundaries ({} matched)",
                stats.completed, stats.scanned, stats.matched
            );
        }
    }

    Ok(())
}
