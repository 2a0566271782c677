use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::tags::{BookTags, TagField};

static AUTHOR_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^-]*) - (.*)\.m4b$").expect("author/title pattern is valid")
});

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot derive author and title for '{0}' from its tags or its file name")]
    Unresolved(PathBuf),
    #[error("author or title for '{0}' is empty once unsafe characters are removed")]
    EmptySegment(PathBuf),
    #[error("author or title for '{path}' is '{segment}', which is not a usable directory name")]
    ReservedSegment { path: PathBuf, segment: String },
}

/// Where the author/title pair came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    Metadata,
    Filename,
}

/// Sanitized author and title for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub author: String,
    pub title: String,
    pub source: ResolutionSource,
}

impl Resolution {
    /// `"{author} - {title}.m4b"`.
    pub fn file_name(&self) -> String {
        format!("{} - {}.m4b", self.author, self.title)
    }
}

/// Characters that must never reach a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectSet(Vec<char>);

impl RejectSet {
    pub fn new(chars: &str) -> Self {
        Self(chars.chars().collect())
    }

    pub fn sanitize(&self, segment: &str) -> String {
        segment.chars().filter(|c| !self.0.contains(c)).collect()
    }
}

impl Default for RejectSet {
    fn default() -> Self {
        Self::new("'\"/")
    }
}

/// Author from tags: both artist fields must name the same people.
fn author_from_tags(tags: &BookTags) -> Option<String> {
    let mut album_artists = tags.names(TagField::AlbumArtist);
    let mut artists = tags.names(TagField::Artist);
    if album_artists.is_empty() && artists.is_empty() {
        debug!("No album artist or artist tag found");
        return None;
    }
    album_artists.sort_unstable();
    artists.sort_unstable();
    if album_artists == artists {
        album_artists.first().map(|s| s.to_string())
    } else {
        warn!(
            "Album artist and artist tags do not match: {album_artists:?}, {artists:?}. \
             Falling back to filename parsing."
        );
        None
    }
}

/// Title from tags: track title and album must agree.
fn title_from_tags(tags: &BookTags) -> Option<String> {
    match (tags.get(TagField::TrackTitle), tags.get(TagField::Album)) {
        (Some(title), Some(album)) if title == album => Some(title.to_string()),
        (Some(title), Some(album)) => {
            warn!(
                "Title and album tags do not match: '{title}', '{album}'. \
                 Falling back to filename parsing."
            );
            None
        }
        _ => {
            debug!("Title or album tag missing");
            None
        }
    }
}

/// Split `"Author - Title.m4b"` into its two halves.
pub fn parse_file_name(name: &str) -> Option<(String, String)> {
    let caps = AUTHOR_TITLE.captures(name)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Work out the author and title a file should be filed under.
///
/// Tags win when they are self-consistent. Otherwise, or when they are
/// missing, both values come from the file name. Tags that disagree are never
/// merged.
pub fn resolve(
    path: &Path,
    tags: Option<&BookTags>,
    reject: &RejectSet,
) -> Result<Resolution, ResolveError> {
    let mut author = tags.and_then(author_from_tags);
    let mut title = tags.and_then(title_from_tags);
    let mut source = ResolutionSource::Metadata;

    if author.is_none() || title.is_none() {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ResolveError::Unresolved(path.to_path_buf()))?;
        let (a, t) =
            parse_file_name(name).ok_or_else(|| ResolveError::Unresolved(path.to_path_buf()))?;
        debug!("File split: '{a}' / '{t}'");
        author = Some(a);
        title = Some(t);
        source = ResolutionSource::Filename;
    }

    let (Some(author), Some(title)) = (author, title) else {
        return Err(ResolveError::Unresolved(path.to_path_buf()));
    };

    let author = reject.sanitize(&author);
    let title = reject.sanitize(&title);
    if author.trim().is_empty() || title.trim().is_empty() {
        return Err(ResolveError::EmptySegment(path.to_path_buf()));
    }
    if let Some(segment) = [&author, &title].into_iter().find(|s| matches!(s.as_str(), "." | "..")) {
        return Err(ResolveError::ReservedSegment {
            path: path.to_path_buf(),
            segment: segment.clone(),
        });
    }

    debug!("Resolved '{}' to author '{author}', title '{title}' ({source:?})", path.display());
    Ok(Resolution {
        author,
        title,
        source,
    })
}
