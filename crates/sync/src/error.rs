use std::fmt;

use idnb_core::Level;
use idnb_store::StoreError;

#[derive(Debug)]
pub enum SyncError {
    /// Storage failure during scan, resolve, or commit. Aborts the run.
    Store(StoreError),
    /// The canonical reference table for the level is empty; matching
    /// against it would silently match nothing.
    EmptyReference(Level),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::EmptyReference(level) => {
                write!(f, "no canonical {level} data loaded; run 'seed' first")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::EmptyReference(_) => None,
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
