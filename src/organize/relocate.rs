use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::resolve::Resolution;

/// Modes enforced on everything the relocator creates or moves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PermissionPolicy {
    pub dir_mode: u32,
    pub file_mode: u32,
}

impl PermissionPolicy {
    pub fn new(dir_mode: u32, file_mode: u32) -> Self {
        Self {
            dir_mode,
            file_mode,
        }
    }

    pub fn apply_dir(&self, path: &Path) -> io::Result<()> {
        set_mode(path, self.dir_mode)
    }

    pub fn apply_file(&self, path: &Path) -> io::Result<()> {
        set_mode(path, self.file_mode)
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> io::Result<()> {
    debug!("Permission modes are not supported here, leaving '{}' as is", path.display());
    Ok(())
}

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to set permissions on '{path}': {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
#[error("failed to prune '{path}': {source}")]
pub struct PruneError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The three paths a resolution maps to under a library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub author_dir: PathBuf,
    pub title_dir: PathBuf,
    pub final_path: PathBuf,
}

impl ResolvedDestination {
    pub fn compose(root: &Path, resolution: &Resolution) -> Self {
        let author_dir = root.join(&resolution.author);
        let title_dir = author_dir.join(&resolution.title);
        let final_path = title_dir.join(resolution.file_name());
        Self {
            author_dir,
            title_dir,
            final_path,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Moved { from: PathBuf, to: PathBuf },
    SkippedExists { path: PathBuf },
    Failed { path: PathBuf, reason: RelocateError },
}

/// Create `dir` if needed and normalize its mode either way.
fn ensure_dir(dir: &Path, policy: &PermissionPolicy) -> Result<(), RelocateError> {
    match fs::create_dir(dir) {
        Ok(()) => debug!("Created directory '{}'", dir.display()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
        Err(source) => {
            return Err(RelocateError::CreateDir {
                path: dir.to_path_buf(),
                source,
            });
        }
    }
    policy
        .apply_dir(dir)
        .map_err(|source| RelocateError::Permissions {
            path: dir.to_path_buf(),
            source,
        })
}

/// Rename when possible, otherwise copy the contents and delete the original.
/// Timestamps and ownership are not carried over by the copy.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}

/// Outcome of a move that already happened. The file is at `to` either way, so
/// a failed chmod is only a warning.
pub(super) fn settle_move(from: &Path, to: PathBuf, chmod: io::Result<()>) -> Outcome {
    if let Err(source) = chmod {
        let err = RelocateError::Permissions {
            path: to.clone(),
            source,
        };
        warn!("{err}; the file was moved but keeps its previous mode");
    }
    Outcome::Moved {
        from: from.to_path_buf(),
        to,
    }
}

/// Moves resolved files into `{root}/{author}/{title}/` one at a time.
///
/// Directories vacated by successful moves are remembered and only pruned by
/// [`Relocator::prune`], once the whole batch is done.
#[derive(Debug)]
pub struct Relocator {
    root: PathBuf,
    policy: PermissionPolicy,
    vacated: Vec<PathBuf>,
}

impl Relocator {
    pub fn new(root: impl Into<PathBuf>, policy: PermissionPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            vacated: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn destination(&self, resolution: &Resolution) -> ResolvedDestination {
        ResolvedDestination::compose(&self.root, resolution)
    }

    /// Create the library root (and its parents) and enforce the directory mode on it.
    pub fn prepare_root(&self) -> Result<(), RelocateError> {
        fs::create_dir_all(&self.root).map_err(|source| RelocateError::CreateDir {
            path: self.root.clone(),
            source,
        })?;
        self.policy
            .apply_dir(&self.root)
            .map_err(|source| RelocateError::Permissions {
                path: self.root.clone(),
                source,
            })
    }

    /// Move one file. Never overwrites; never returns early on I/O failure.
    pub fn relocate(&mut self, source: &Path, resolution: &Resolution) -> Outcome {
        let dest = self.destination(resolution);
        debug!("Generated author directory: '{}'", dest.author_dir.display());
        debug!("Generated title directory: '{}'", dest.title_dir.display());
        debug!("New file path: '{}'", dest.final_path.display());

        if let Err(reason) = ensure_dir(&dest.author_dir, &self.policy)
            .and_then(|()| ensure_dir(&dest.title_dir, &self.policy))
        {
            return Outcome::Failed {
                path: source.to_path_buf(),
                reason,
            };
        }

        if dest.final_path.exists() {
            return Outcome::SkippedExists {
                path: dest.final_path,
            };
        }

        info!(
            "Moving file '{}' to '{}'. This may take a while....",
            source.display(),
            dest.final_path.display()
        );
        if let Err(e) = move_file(source, &dest.final_path) {
            return Outcome::Failed {
                path: source.to_path_buf(),
                reason: RelocateError::Move {
                    from: source.to_path_buf(),
                    to: dest.final_path,
                    source: e,
                },
            };
        }

        if let Some(parent) = source.parent() {
            let parent = parent.to_path_buf();
            if !self.vacated.contains(&parent) {
                self.vacated.push(parent);
            }
        }

        let chmod = self.policy.apply_file(&dest.final_path);
        settle_move(source, dest.final_path, chmod)
    }

    /// Directories files were moved out of, in first-seen order.
    pub fn vacated(&self) -> &[PathBuf] {
        &self.vacated
    }

    /// Remove vacated directories and any ancestors left empty.
    ///
    /// Never climbs to or past a directory in `stop_at`. Returns the removed
    /// directories; failures are logged and skipped.
    pub fn prune(&self, stop_at: &[PathBuf]) -> Vec<PathBuf> {
        let stops: Vec<PathBuf> = stop_at.iter().map(|p| absolute_or_same(p)).collect();
        let mut removed = Vec::new();
        for dir in &self.vacated {
            prune_upward(&absolute_or_same(dir), &stops, &mut removed);
        }
        removed
    }
}

fn absolute_or_same(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

fn prune_upward(start: &Path, stops: &[PathBuf], removed: &mut Vec<PathBuf>) {
    let mut current = Some(start);
    while let Some(dir) = current {
        if stops.iter().any(|s| s == dir) {
            debug!("Reached '{}', not pruning further", dir.display());
            return;
        }
        if !dir.is_dir() {
            return;
        }
        match is_empty_dir(dir) {
            Ok(true) => {}
            Ok(false) => {
                debug!("'{}' is not empty, stopping", dir.display());
                return;
            }
            Err(source) => {
                let err = PruneError {
                    path: dir.to_path_buf(),
                    source,
                };
                warn!("{err}");
                return;
            }
        }
        if let Err(source) = fs::remove_dir(dir) {
            let err = PruneError {
                path: dir.to_path_buf(),
                source,
            };
            warn!("{err}");
            return;
        }
        info!("Pruned empty directory '{}'", dir.display());
        removed.push(dir.to_path_buf());
        current = dir.parent();
    }
}

/// Rename `source` to `"{author} - {title}.m4b"` inside its own directory.
pub fn rename_in_place(source: &Path, resolution: &Resolution) -> Outcome {
    let target = source
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(resolution.file_name());
    if target.exists() {
        return Outcome::SkippedExists { path: target };
    }
    match fs::rename(source, &target) {
        Ok(()) => Outcome::Moved {
            from: source.to_path_buf(),
            to: target,
        },
        Err(e) => Outcome::Failed {
            path: source.to_path_buf(),
            reason: RelocateError::Move {
                from: source.to_path_buf(),
                to: target,
                source: e,
            },
        },
    }
}
