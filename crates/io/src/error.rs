use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File read/write error.
    Io(String),
    /// JSON parse / structure error.
    Json(String),
    /// A source feature is missing a required field (e.g. FID).
    MissingField { index: usize, field: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::MissingField { index, field } => {
                write!(f, "feature {index}: missing field '{field}'")
            }
        }
    }
}

impl std::error::Error for IoError {}
