use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::report::RunSummary;

/// One run's summary retained in bounded history for regression comparison.
pub type TrendPoint = RunSummary;

pub const DEFAULT_CAPACITY: usize = 30;

/// Durable, bounded run history on disk (`trends.json`).
///
/// Writes go through a temp file in the destination directory and are renamed
/// over the target, so a failed write never leaves a half-written history.
/// Concurrent writers are out of scope; unwritable storage fails explicitly.
#[derive(Debug, Clone)]
pub struct TrendStore {
    path: PathBuf,
    capacity: usize,
}

impl TrendStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted history, oldest first. A missing file is an empty
    /// history; an unreadable or corrupt file is an error, never a silent
    /// reset.
    pub fn load(&self) -> Result<Vec<TrendPoint>, Error> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(Error::persistence(&self.path, err)),
        };
        serde_json::from_slice(&bytes).map_err(|err| Error::persistence(&self.path, err))
    }

    /// Appends one point, evicting the oldest entries beyond capacity, and
    /// persists the whole sequence atomically. Returns the kept history.
    pub fn append(&self, point: TrendPoint) -> Result<Vec<TrendPoint>, Error> {
        let mut history = self.load()?;
        history.push(point);
        if history.len() > self.capacity {
            let over = history.len() - self.capacity;
            history.drain(0..over);
        }
        self.write_atomic(&history)?;
        Ok(history)
    }

    fn write_atomic(&self, history: &[TrendPoint]) -> Result<(), Error> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|err| Error::persistence(&self.path, err))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|err| Error::persistence(&self.path, err))?;
        serde_json::to_writer_pretty(&mut tmp, history)
            .map_err(|err| Error::persistence(&self.path, err))?;
        tmp.flush().map_err(|err| Error::persistence(&self.path, err))?;
        tmp.persist(&self.path)
            .map_err(|err| Error::persistence(&self.path, err))?;
        Ok(())
    }
}
