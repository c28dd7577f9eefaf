//! Error taxonomy for per-file processing and supervision of stage threads.

use anyhow::Result;
use log::error;
use std::path::PathBuf;
use std::thread::JoinHandle;

/// Outcome of tokenizing one file when it did not produce records.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// Read or decode failure. The file is dropped and the worker keeps going.
    #[error("discarding {path}: {source}")]
    Discard {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Anything else. Fatal to the worker that hit it.
    #[error("unexpected failure processing {path}: {reason}")]
    Unexpected { path: PathBuf, reason: String },
}

impl FileError {
    pub fn discard(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FileError::Discard {
            path: path.into(),
            source,
        }
    }

    pub fn unexpected(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FileError::Unexpected {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FileError::Unexpected { .. })
    }
}

/// Join a stage thread, turning a panic into an error.
pub fn join_stage(name: &str, handle: JoinHandle<Result<()>>) -> Result<()> {
    match handle.join() {
        Ok(res) => res.map_err(|e| e.context(format!("{name} failed"))),
        Err(_) => Err(anyhow::anyhow!("{name} thread panicked")),
    }
}

/// Join every handle, logging each failure. Returns the first failure, if any.
pub fn join_all_stages<I>(stages: I) -> Result<()>
where
    I: IntoIterator<Item = (String, JoinHandle<Result<()>>)>,
{
    let mut first: Option<anyhow::Error> = None;
    for (name, handle) in stages {
        if let Err(e) = join_stage(&name, handle) {
            error!("{e:#}");
            first.get_or_insert(e);
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
