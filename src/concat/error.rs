use std::path::PathBuf;

use thiserror::Error;

/// Anything that stops a concatenation job. Offsets are cumulative, so one bad
/// track invalidates the whole chapter list.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("no '.{format}' tracks found in '{dir}'")]
    NoTracks { dir: PathBuf, format: String },
    #[error("'{0}' does not look like '<number> <title>.<ext>'")]
    PatternMismatch(PathBuf),
    #[error("could not probe duration of '{path}': {reason}")]
    Probe { path: PathBuf, reason: String },
    #[error("merge of '{output}' failed: {reason}")]
    Merge { output: PathBuf, reason: String },
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
