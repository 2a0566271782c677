use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

use crate::cli::{OrganizeArgs, SourceArgs};
use crate::config::{Settings, parse_mode};
use crate::organize::{
    BatchReport, OrganizeOptions, PermissionPolicy, RejectSet, Relocator, autoname_files,
    organize_files,
};
use crate::tags::LoftyStore;

use super::source::{list_files, source_dir, source_path, working_dir};

const BOOK_EXTENSION: &str = "m4b";

/// Flag first, then config. There is no built-in default.
fn required_mode(flag: Option<&str>, configured: Option<&str>, name: &str) -> Result<u32> {
    let raw = flag.or(configured).ok_or_else(|| {
        anyhow!("no {name} given; pass --{name} or set organize.{} in the config", name.replace('-', "_"))
    })?;
    parse_mode(raw).map_err(|e| anyhow!("invalid {name} '{raw}': {e}"))
}

fn summarize(report: &BatchReport, verb: &str) -> Result<()> {
    info!(
        "{} files processed: {} {verb}, {} skipped, {} failed, {} directories pruned",
        report.total(),
        report.moved,
        report.skipped,
        report.failed,
        report.pruned.len()
    );
    if report.failed > 0 {
        bail!("{} of {} files failed", report.failed, report.total());
    }
    Ok(())
}

pub fn organize(args: &OrganizeArgs, settings: &Settings) -> Result<()> {
    let dir_mode = required_mode(
        args.dir_mode.as_deref(),
        settings.organize.dir_mode.as_deref(),
        "dir-mode",
    )?;
    let file_mode = required_mode(
        args.file_mode.as_deref(),
        settings.organize.file_mode.as_deref(),
        "file-mode",
    )?;

    let source = source_path(&args.source)?;
    let files = list_files(&args.source, BOOK_EXTENSION, &settings.library)?;
    if files.is_empty() {
        warn!("No .{BOOK_EXTENSION} files found in '{}'", source.display());
        return Ok(());
    }

    let cwd = working_dir()?;
    let root = match args.destination.as_ref().or(settings.organize.destination.as_ref()) {
        Some(dest) => dest.clone(),
        None => cwd.clone(),
    };
    let options = OrganizeOptions {
        dry_run: args.dry_run,
        prune: args.prune_override().unwrap_or(settings.organize.prune),
    };

    let mut relocator = Relocator::new(root, PermissionPolicy::new(dir_mode, file_mode));
    if !options.dry_run {
        relocator
            .prepare_root()
            .with_context(|| format!("cannot prepare library root '{}'", relocator.root().display()))?;
    }

    let reject = RejectSet::new(&settings.organize.reject_characters);
    let stop_at = [cwd, source_dir(&source)];
    let report = organize_files(
        &files,
        &LoftyStore,
        &reject,
        &mut relocator,
        options,
        &stop_at,
    );
    summarize(&report, if options.dry_run { "to move" } else { "moved" })
}

pub fn autoname(args: &SourceArgs, settings: &Settings) -> Result<()> {
    let source = source_path(args)?;
    let files = list_files(args, BOOK_EXTENSION, &settings.library)?;
    if files.is_empty() {
        warn!("No .{BOOK_EXTENSION} files found in '{}'", source.display());
        return Ok(());
    }
    let reject = RejectSet::new(&settings.organize.reject_characters);
    let report = autoname_files(&files, &LoftyStore, &reject);
    summarize(&report, "renamed")
}
