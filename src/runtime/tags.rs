use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use tracing::{error, info, warn};

use crate::cli::{SetArgs, SourceArgs, VerifyArgs};
use crate::config::Settings;
use crate::organize::{BatchReport, RejectSet, rename_in_place, resolve};
use crate::tags::{
    BookTags, Cover, LoftyStore, NoInput, Prompter, TagRequest, TagStore, TagValue, amend_plan,
    canonical_genre, fix_plan, plan_updates, render, verify,
};

use super::prompt::TerminalPrompter;
use super::source::{list_files, source_path};

const BOOK_EXTENSION: &str = "m4b";

fn book_files(args: &SourceArgs, settings: &Settings) -> Result<Vec<PathBuf>> {
    let files = list_files(args, BOOK_EXTENSION, &settings.library)?;
    if files.is_empty() {
        let source = source_path(args)?;
        warn!("No .{BOOK_EXTENSION} files found in '{}'", source.display());
    }
    Ok(files)
}

fn fail_if_any(failed: usize, total: usize, what: &str) -> Result<()> {
    if failed > 0 {
        bail!("{failed} of {total} files {what}");
    }
    Ok(())
}

pub fn print(args: &SourceArgs, settings: &Settings) -> Result<()> {
    let files = book_files(args, settings)?;
    let mut failed = 0;
    for file in &files {
        match LoftyStore.read(file) {
            Ok(tags) => {
                println!("{}", file.display());
                print!("{}", render(&tags));
                println!();
            }
            Err(e) => {
                error!("{e}");
                failed += 1;
            }
        }
    }
    fail_if_any(failed, files.len(), "could not be read")
}

/// Flags as a request; genres are checked against the known list up front.
fn request_from(args: &SetArgs) -> Result<TagRequest> {
    let genres = args
        .genres
        .iter()
        .map(|g| {
            canonical_genre(g)
                .map(str::to_string)
                .ok_or_else(|| anyhow!("unknown genre '{g}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    let cover = args.cover.as_deref().map(Cover::from_path).transpose()?;

    Ok(TagRequest {
        author: args.author.clone(),
        title: args.title.clone(),
        year: args.date.clone(),
        genres,
        description: args.description.clone(),
        narrator: args.narrator.clone(),
        series_name: args.series_name.clone(),
        series_part: args.series_part,
        cover,
    })
}

fn describe(value: &TagValue) -> String {
    match value {
        TagValue::Text(text) => format!("'{text}'"),
        TagValue::Cover(cover) => {
            format!("<{} image, {} bytes>", cover.format.label(), cover.data.len())
        }
    }
}

/// Plan, confirm and save one file. Returns the saved tags, if any.
fn set_one(
    file: &Path,
    request: &TagRequest,
    args: &SetArgs,
    prompter: &mut dyn Prompter,
) -> Result<Option<BookTags>> {
    let current = LoftyStore.read(file)?;
    prompter.say(&format!("\n== {} ==", file.display()))?;

    let mut plan = plan_updates(&current, request, prompter)?;
    amend_plan(&mut plan, &current, prompter)?;
    if plan.is_empty() {
        info!("No changes for '{}'", file.display());
        return Ok(None);
    }

    for (field, value) in plan.changes() {
        prompter.say(&format!("  {field} -> {}", describe(value)))?;
    }
    if !args.yes && !prompter.confirm("Save changes?")? {
        info!("Discarded changes for '{}'", file.display());
        return Ok(None);
    }

    let updated = plan.applied_to(&current);
    LoftyStore.write(file, &updated)?;
    info!("Saved tags to '{}'", file.display());
    Ok(Some(updated))
}

pub fn set(args: &SetArgs, settings: &Settings) -> Result<()> {
    let request = request_from(args)?;
    let files = book_files(&args.source, settings)?;
    let reject = RejectSet::new(&settings.organize.reject_characters);

    let mut terminal;
    let mut quiet = NoInput;
    let prompter: &mut dyn Prompter = if args.no_input {
        &mut quiet
    } else {
        terminal = TerminalPrompter::stdio();
        &mut terminal
    };

    let mut failed = 0;
    let mut renames = BatchReport::default();
    for file in &files {
        let saved = match set_one(file, &request, args, prompter) {
            Ok(saved) => saved,
            Err(e) => {
                error!("'{}': {e:#}", file.display());
                failed += 1;
                continue;
            }
        };
        let Some(tags) = saved else { continue };

        let resolution = match resolve(file, Some(&tags), &reject) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!("Not renaming: {e}");
                continue;
            }
        };
        let wanted = resolution.file_name();
        if file.file_name().and_then(|n| n.to_str()) == Some(wanted.as_str()) {
            continue;
        }
        if prompter.confirm(&format!("Rename file to '{wanted}'?"))? {
            renames.record(&rename_in_place(file, &resolution));
        }
    }

    fail_if_any(failed + renames.failed, files.len(), "could not be updated")
}

pub fn verify_files(args: &VerifyArgs, settings: &Settings) -> Result<()> {
    let files = book_files(&args.source, settings)?;
    let mut unhealthy = 0;

    for file in &files {
        let mut tags = match LoftyStore.read(file) {
            Ok(tags) => tags,
            Err(e) => {
                error!("{e}");
                unhealthy += 1;
                continue;
            }
        };

        if args.fix {
            let plan = fix_plan(&tags);
            if !plan.is_empty() {
                let fixed = plan.applied_to(&tags);
                match LoftyStore.write(file, &fixed) {
                    Ok(()) => {
                        info!("Fixed {} tags in '{}'", plan.changes().len(), file.display());
                        tags = fixed;
                    }
                    Err(e) => error!("{e}"),
                }
            }
        }

        let problems = verify(&tags);
        if problems.is_empty() {
            println!("{}: ok", file.display());
            continue;
        }
        unhealthy += 1;
        for problem in &problems {
            println!("{}: {problem}", file.display());
        }
    }

    fail_if_any(unhealthy, files.len(), "have tag problems")
}
