//! Run-level and line-level error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of one run. Per-line problems never surface here;
/// see [`RecordError`].
#[derive(Debug, Error)]
pub enum RankError {
    #[error("input {} cannot be opened: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read failed on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("worker pool could not be built: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("worker {0} panicked while counting")]
    WorkerPanicked(usize),
}

impl RankError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        RankError::Io { path: path.to_path_buf(), source }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;

/// Why a single line was skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("line is not a JSON object")]
    NotAnObject,

    #[error("empty line")]
    Empty,

    #[error("missing field `{0}`")]
    MissingField(&'static str),
}
