use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::error::ConcatError;
use super::probe::DurationProbe;

static TRACK_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(.+)\.[^.]+$").expect("track name pattern is valid"));

/// Header line every FFMETADATA document starts with.
pub const FFMETADATA_HEADER: &str = ";FFMETADATA1";

/// Chapter offsets are expressed in microseconds.
pub const TIMEBASE: &str = "1/1000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pub duration_micros: u64,
    pub start_micros: u64,
    pub end_micros: u64,
}

/// `"0005 Riddles in the Dark.mp3"` -> `(5, "Riddles in the Dark")`.
pub fn parse_track_name(name: &str) -> Option<(u64, String)> {
    let caps = TRACK_NAME.captures(name)?;
    let number = caps[1].parse().ok()?;
    let title = caps[2].trim().to_string();
    Some((number, title))
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Order tracks by their numeric prefix, then by name. Files without a prefix
/// sort first so the build fails on them straight away.
pub fn sort_tracks(files: &mut [PathBuf]) {
    files.sort_by_cached_key(|p| {
        let name = file_name(p).unwrap_or_default().to_string();
        let number = parse_track_name(&name).map(|(n, _)| n);
        (number, name)
    });
}

/// Chapters from `(title, duration)` pairs: the first starts at 0, each ends at
/// `start + duration` and the next starts one microsecond later.
pub fn layout(entries: impl IntoIterator<Item = (String, u64)>) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut start = 0u64;
    for (index, (title, duration_micros)) in entries.into_iter().enumerate() {
        let end = start + duration_micros;
        chapters.push(Chapter {
            index,
            title,
            duration_micros,
            start_micros: start,
            end_micros: end,
        });
        start = end + 1;
    }
    chapters
}

/// Build chapters for already-sorted tracks.
///
/// Fails on the first file whose name doesn't parse or whose duration can't be
/// probed; no partial list is returned.
pub fn build_chapters(
    files: &[PathBuf],
    probe: &dyn DurationProbe,
) -> Result<Vec<Chapter>, ConcatError> {
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let name = file_name(file).ok_or_else(|| ConcatError::PatternMismatch(file.clone()))?;
        let (number, title) =
            parse_track_name(name).ok_or_else(|| ConcatError::PatternMismatch(file.clone()))?;
        debug!("Extracted chapter number: '{number}', title: '{title}'");

        let duration = probe.duration_micros(file)?;
        debug!("Duration in microseconds: {duration}");
        entries.push((title, duration));
    }
    Ok(layout(entries))
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render the chapter-marker document ffmpeg reads with `-map_metadata`.
pub fn render_ffmetadata(chapters: &[Chapter]) -> String {
    let mut out = String::from(FFMETADATA_HEADER);
    out.push('\n');
    for chapter in chapters {
        out.push_str(&format!(
            "\n[CHAPTER]\nTIMEBASE={TIMEBASE}\nSTART={}\nEND={}\ntitle={}\n",
            chapter.start_micros,
            chapter.end_micros,
            escape_value(&chapter.title)
        ));
    }
    out
}
