use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::tags::{BookTags, TagStore};

use super::relocate::{Outcome, Relocator, rename_in_place};
use super::resolve::{RejectSet, Resolution, resolve};

#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// Resolve and report destinations without touching the filesystem.
    pub dry_run: bool,
    /// Remove source directories emptied by the batch.
    pub prune: bool,
}

/// Per-batch tally; every file lands in exactly one bucket.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pruned: Vec<PathBuf>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Moved { from, to } => {
                info!("Done moving file '{}' to '{}'.", from.display(), to.display());
                self.moved += 1;
            }
            Outcome::SkippedExists { path } => {
                warn!("File '{}' already exists, skipping....", path.display());
                self.skipped += 1;
            }
            Outcome::Failed { path, reason } => {
                error!("Error moving file '{}': {reason}", path.display());
                self.failed += 1;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.moved + self.skipped + self.failed
    }
}

fn read_tags(store: &dyn TagStore, path: &Path) -> Option<BookTags> {
    match store.read(path) {
        Ok(tags) => Some(tags),
        Err(e) => {
            warn!("{e}. Falling back to filename parsing.");
            None
        }
    }
}

fn resolve_one(store: &dyn TagStore, path: &Path, reject: &RejectSet) -> Option<Resolution> {
    let tags = read_tags(store, path);
    match resolve(path, tags.as_ref(), reject) {
        Ok(resolution) => Some(resolution),
        Err(e) => {
            error!("{e}");
            None
        }
    }
}

/// Resolve and relocate every file, isolating per-file failures.
///
/// Pruning, when enabled, runs after the last file so no pending move can
/// lose its source directory.
pub fn organize_files(
    files: &[PathBuf],
    store: &dyn TagStore,
    reject: &RejectSet,
    relocator: &mut Relocator,
    options: OrganizeOptions,
    stop_at: &[PathBuf],
) -> BatchReport {
    let mut report = BatchReport::default();
    let mut planned = HashSet::new();

    for file in files {
        info!("Processing file: '{}'", file.display());
        let Some(resolution) = resolve_one(store, file, reject) else {
            report.failed += 1;
            continue;
        };

        if options.dry_run {
            let dest = relocator.destination(&resolution);
            info!("Would move '{}' to '{}'", file.display(), dest.final_path.display());
            let taken = dest.final_path.exists() || !planned.insert(dest.final_path.clone());
            if taken {
                warn!("File '{}' already exists and would be skipped", dest.final_path.display());
                report.skipped += 1;
            } else {
                report.moved += 1;
            }
            continue;
        }

        let outcome = relocator.relocate(file, &resolution);
        report.record(&outcome);
    }

    if options.prune && !options.dry_run {
        info!("Pruning empty directories");
        report.pruned = relocator.prune(stop_at);
    }

    report
}

/// Rename each file in place to `"{author} - {title}.m4b"`.
pub fn autoname_files(files: &[PathBuf], store: &dyn TagStore, reject: &RejectSet) -> BatchReport {
    let mut report = BatchReport::default();
    for file in files {
        let Some(resolution) = resolve_one(store, file, reject) else {
            report.failed += 1;
            continue;
        };
        if file.file_name().and_then(|n| n.to_str()) == Some(resolution.file_name().as_str()) {
            info!("'{}' is already named correctly", file.display());
            report.skipped += 1;
            continue;
        }
        let outcome = rename_in_place(file, &resolution);
        report.record(&outcome);
    }
    report
}
