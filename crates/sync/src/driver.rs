// Per-record reconciliation driver.
//
// Run shape: Reset (force only) -> Scan -> Resolve xN -> Commit -> Done,
// with cancellation observable from any non-terminal point. The unmatched
// snapshot is taken once at scan; workers pull records off a shared cursor,
// resolve read-only, and commit each match as a single-row update keyed by
// (fid, level). Cancellation stops scheduling new work; it never rolls back
// committed updates.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use idnb_core::{Level, MatchResult};
use idnb_store::{areas, boundaries};

use crate::error::SyncError;
use crate::resolver;

/// Shared cooperative cancellation flag, checked before a worker starts a
/// new record and again before the commit step.
pub type CancelToken = Arc<AtomicBool>;

/// Progress callback: `(completed, total)` after each finished record.
/// Called from worker threads.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bounded worker count for the resolve/commit fan-out.
    pub concurrency: usize,
    /// Clear all match state at the level before scanning.
    pub force: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { concurrency: 10, force: false }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Unmatched records in the scan snapshot.
    pub scanned: usize,
    /// Records fully processed (resolved, and committed when matched).
    pub completed: usize,
    /// Records actually matched and committed.
    pub matched: usize,
}

/// A run that did not fail. Cancellation is an outcome, not an error, and
/// carries the partial counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncStats),
    Cancelled(SyncStats),
}

impl SyncOutcome {
    pub fn stats(&self) -> SyncStats {
        match self {
            Self::Completed(s) | Self::Cancelled(s) => *s,
        }
    }
}

/// Reconcile all unmatched records at one level.
///
/// Levels must be processed ancestors-first across runs (province before
/// regency before district before village) since the scoped name pass
/// depends on canonical ancestor data. Re-running without `force` on a
/// fully-matched level scans zero records and is a no-op.
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
    drop(conn);

    let total = records.len();
    let stats = SyncStats { scanned: total, ..SyncStats::default() };
    if total == 0 {
        return Ok(SyncOutcome::Completed(stats));
    }
    if cancel.load(Ordering::Relaxed) {
        return Ok(SyncOutcome::Cancelled(stats));
    }

    let workers = config.concurrency.clamp(1, total);
    let next = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);
    let matched = AtomicUsize::new(0);
    let abort = AtomicBool::new(false);
    let failure: Mutex<Option<SyncError>> = Mutex::new(None);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                worker_loop(
                    db_path, level, &records, cancel, &next, &completed, &matched,
                    &abort, &failure, total, progress,
                );
            });
        }
    });

    if let Some(err) = failure.into_inner().unwrap_or_else(|p| p.into_inner()) {
        return Err(err);
    }

    let stats = SyncStats {
        scanned: total,
        completed: completed.load(Ordering::Relaxed),
        matched: matched.load(Ordering::Relaxed),
    };
    if cancel.load(Ordering::Relaxed) {
        Ok(SyncOutcome::Cancelled(stats))
    } else {
        Ok(SyncOutcome::Completed(stats))
    }
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    db_path: &Path,
    level: Level,
    records: &[idnb_core::BoundaryRecord],
    cancel: &CancelToken,
    next: &AtomicUsize,
    completed: &AtomicUsize,
    matched: &AtomicUsize,
    abort: &AtomicBool,
    failure: &Mutex<Option<SyncError>>,
    total: usize,
    progress: ProgressFn<'_>,
) {
    // Each worker holds its own connection; resolution is read-only and the
    // commit touches only this record's row, so writers never conflict.
    let conn = match idnb_store::open(db_path) {
        Ok(conn) => conn,
        Err(e) => {
            record_failure(abort, failure, e.into());
            return;
        }
    };

    loop {
        if abort.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
            return;
        }
        let i = next.fetch_add(1, Ordering::Relaxed);
        if i >= total {
            return;
        }
        let record = &records[i];

        match resolver::resolve_one(&conn, record) {
            Ok(MatchResult { resolved_code: Some(code), .. }) => {
                // Cancellation observed between resolve and commit leaves the
                // record untouched for the next run.
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                let now = chrono::Utc::now().to_rfc3339();
                if let Err(e) =
                    boundaries::commit_match(&conn, level, &record.fid, &code, &now)
                {
                    record_failure(abort, failure, e.into());
                    return;
                }
                matched.fetch_add(1, Ordering::Relaxed);
            }
            // Ambiguous or no evidence: a normal leave-unmatched outcome,
            // silently retried on the next run.
            Ok(_) => {}
            Err(e) => {
                record_failure(abort, failure, e.into());
                return;
            }
        }

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        progress(done, total);
    }
}

fn record_failure(abort: &AtomicBool, failure: &Mutex<Option<SyncError>>, err: SyncError) {
    abort.store(true, Ordering::Relaxed);
    let mut slot = failure.lock().unwrap_or_else(|p| p.into_inner());
    // First failure wins; it aborts the whole run
    slot.get_or_insert(err);
}
