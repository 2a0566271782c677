use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path '{0}' not found")]
    NotFound(PathBuf),
}

/// Case-insensitive extension check; `ext` may be given with or without the dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    let wanted = ext.trim().trim_start_matches('.');
    path.extension()
        .and_then(|s| s.to_str())
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Compile the list of files to process.
///
/// A file source is returned as-is (the extension is not checked). A
/// directory source yields every file with extension `ext`, only the top level
/// unless `recurse` is set, sorted by path.
pub fn collect_files(
    source: &Path,
    ext: &str,
    recurse: bool,
    settings: &LibrarySettings,
) -> Result<Vec<PathBuf>, ScanError> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    if !source.is_dir() {
        return Err(ScanError::NotFound(source.to_path_buf()));
    }

    let mut walker = WalkDir::new(source).follow_links(settings.follow_links);
    if !recurse {
        walker = walker.max_depth(1);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under '{}': {e}", source.display());
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && has_extension(path, ext) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!("Collected {} '.{ext}' file(s) from '{}'", files.len(), source.display());
    Ok(files)
}
