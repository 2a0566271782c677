use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::SourceArgs;
use crate::config::LibrarySettings;
use crate::library::collect_files;

pub fn working_dir() -> Result<PathBuf> {
    env::current_dir().context("cannot determine the working directory")
}

/// `--source`, or the working directory.
pub fn source_path(args: &SourceArgs) -> Result<PathBuf> {
    match &args.source {
        Some(path) => Ok(path.clone()),
        None => working_dir(),
    }
}

/// The directory a source lives in: itself, or a file's parent.
pub fn source_dir(source: &Path) -> PathBuf {
    if source.is_dir() {
        return source.to_path_buf();
    }
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn list_files(args: &SourceArgs, ext: &str, library: &LibrarySettings) -> Result<Vec<PathBuf>> {
    let source = source_path(args)?;
    let files = collect_files(&source, ext, args.recurse, library)?;
    Ok(files)
}
