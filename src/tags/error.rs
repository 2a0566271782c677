use std::path::PathBuf;

use thiserror::Error;

use super::field::TagField;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("failed to read tags from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
    #[error("failed to write tags to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
    #[error("'{path}' cannot store the {field} tag")]
    UnsupportedField { path: PathBuf, field: TagField },
    #[error("'{0}' has no tag that can be written")]
    NoTag(PathBuf),
    #[error("unsupported cover image '{0}': only PNG and JPEG are accepted")]
    UnsupportedCover(PathBuf),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
