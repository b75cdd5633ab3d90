use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A snapshot was requested before `run_end` was observed. A truncated
    /// event stream (cancelled or crashed runner) surfaces here.
    #[error("incomplete run: the event stream ended without run_end")]
    IncompleteRun,

    #[error("invalid coverage plan: {0}")]
    InvalidPlan(#[from] serde_yaml::Error),

    /// A report or trend artifact could not be read or written. Surfaced to
    /// the caller; in-memory results remain valid and must still be reported.
    #[error("persistence failed for {path}: {message}")]
    Persistence { path: PathBuf, message: String },
}

impl Error {
    pub fn persistence(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
