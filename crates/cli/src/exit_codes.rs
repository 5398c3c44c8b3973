//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success (including a cancelled run)            |
//! | 1    | General error                                  |
//! | 2    | Usage error (bad arguments)                    |
//! | 3    | Missing prerequisite (no data loaded/matched)  |
//! | 4    | Storage error                                  |
//! | 5    | Remote fetch error                             |

/// Success - command completed (a cancelled run still exits 0 with
/// partial counts; cancellation is not a failure).
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid level.
pub const EXIT_USAGE: u8 = 2;

/// Missing prerequisite - no raw data loaded, no canonical data seeded,
/// or nothing matched yet.
pub const EXIT_NO_DATA: u8 = 3;

/// Storage error - SQLite failure during a run (aborts the run).
pub const EXIT_STORE: u8 = 4;

/// Remote fetch error - upstream boundary could not be retrieved.
pub const EXIT_FETCH: u8 = 5;
