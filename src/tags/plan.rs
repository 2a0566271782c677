//! Reconciling current tags with requested values.
//!
//! Nothing here touches a terminal or a file: questions go through a
//! [`Prompter`] and the outcome is a [`TagUpdatePlan`] the caller applies.

use std::fmt;
use std::io;
use std::path::Path;

use tracing::warn;

use super::book::{BookTags, Cover};
use super::field::{GENRES, TAG_DELIMITER, TagField};

/// Source of answers for the questions asked while planning.
pub trait Prompter {
    /// Yes/no question.
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
    /// Free-form answer, trimmed. Empty means "skip".
    fn input(&mut self, prompt: &str) -> io::Result<String>;
    /// Pick any number of genres from `available`.
    fn choose_genres(&mut self, available: &[&str]) -> io::Result<Vec<String>>;
    /// Show a line of information.
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Answers "no" and "" to everything, so only explicit values apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl Prompter for NoInput {
    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        Ok(false)
    }

    fn input(&mut self, _prompt: &str) -> io::Result<String> {
        Ok(String::new())
    }

    fn choose_genres(&mut self, _available: &[&str]) -> io::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn say(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Values given on the command line for `tags set`.
#[derive(Debug, Clone, Default)]
pub struct TagRequest {
    pub author: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub genres: Vec<String>,
    pub description: Option<String>,
    pub narrator: Option<String>,
    pub series_name: Option<String>,
    pub series_part: Option<f64>,
    pub cover: Option<Cover>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Cover(Cover),
}

/// Ordered field assignments; later entries win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagUpdatePlan {
    changes: Vec<(TagField, TagValue)>,
}

impl TagUpdatePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, field: TagField, value: impl Into<String>) {
        self.changes.push((field, TagValue::Text(value.into())));
    }

    /// Set `field` and its mirrored counterpart, if any.
    pub fn set_mirrored(&mut self, field: TagField, value: &str) {
        self.set_text(field, value);
        if let Some(mirror) = field.mirror() {
            self.set_text(mirror, value);
        }
    }

    pub fn set_cover(&mut self, cover: Cover) {
        self.changes.push((TagField::Cover, TagValue::Cover(cover)));
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[(TagField, TagValue)] {
        &self.changes
    }

    pub fn apply(&self, tags: &mut BookTags) {
        for (field, value) in &self.changes {
            match value {
                TagValue::Text(text) => tags.set(*field, text.as_str()),
                TagValue::Cover(cover) => tags.set_cover(Some(cover.clone())),
            }
        }
    }

    /// `current` with this plan applied.
    pub fn applied_to(&self, current: &BookTags) -> BookTags {
        let mut tags = current.clone();
        self.apply(&mut tags);
        tags
    }
}

/// Render a series part the way it is stored: `3`, `2.5`.
pub fn format_series_part(part: f64) -> String {
    format!("{part}")
}

fn parse_series_part(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Work out which tags need to change for one file.
///
/// Walks the required fields: explicit values always win, mirrored pairs are
/// filled from whichever side is present, and the prompter is asked for
/// anything still missing or inconsistent.
pub fn plan_updates(
    current: &BookTags,
    request: &TagRequest,
    prompter: &mut dyn Prompter,
) -> io::Result<TagUpdatePlan> {
    let mut plan = TagUpdatePlan::new();

    for field in TagField::REQUIRED {
        match field {
            TagField::TrackTitle => reconcile_pair(
                &mut plan,
                current,
                TagField::TrackTitle,
                request.title.as_deref(),
                "title",
                prompter,
            )?,
            TagField::Artist => reconcile_pair(
                &mut plan,
                current,
                TagField::Artist,
                request.author.as_deref(),
                "author",
                prompter,
            )?,
            TagField::Description => reconcile_pair(
                &mut plan,
                current,
                TagField::Description,
                request.description.as_deref(),
                "description",
                prompter,
            )?,
            TagField::Genre => plan_genre(&mut plan, current, &request.genres, prompter)?,
            TagField::SeriesName => plan_series(&mut plan, current, request, prompter)?,
            TagField::Narrator => {
                fill_if_unset(&mut plan, current, field, request.narrator.as_deref(), prompter)?
            }
            TagField::Year => {
                fill_if_unset(&mut plan, current, field, request.year.as_deref(), prompter)?
            }
            TagField::Cover => {
                if let Some(cover) = &request.cover {
                    plan.set_cover(cover.clone());
                }
            }
            // Planned together with their counterparts above.
            TagField::Album
            | TagField::AlbumArtist
            | TagField::Comment
            | TagField::SeriesPart => {}
        }
    }

    Ok(plan)
}

fn reconcile_pair(
    plan: &mut TagUpdatePlan,
    current: &BookTags,
    primary: TagField,
    requested: Option<&str>,
    what: &str,
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    let Some(mirror) = primary.mirror() else {
        return Ok(());
    };

    if let Some(value) = non_blank(requested) {
        plan.set_mirrored(primary, value);
        return Ok(());
    }

    match (current.get(primary), current.get(mirror)) {
        (Some(main), None) => plan.set_text(mirror, main),
        (None, Some(other)) => plan.set_text(primary, other),
        (Some(main), Some(other)) if main != other => {
            warn!("{primary} '{main}' does not match {mirror} '{other}'.");
            if prompter.confirm(&format!("Do you want to change the {what}?"))? {
                let value = prompter.input(&format!("Enter new {what}: "))?;
                if !value.is_empty() {
                    plan.set_mirrored(primary, &value);
                }
            }
        }
        (Some(_), Some(_)) => {}
        (None, None) => {
            let value = prompter.input(&format!("Enter {what}: "))?;
            if !value.is_empty() {
                plan.set_mirrored(primary, &value);
            }
        }
    }
    Ok(())
}

fn plan_genre(
    plan: &mut TagUpdatePlan,
    current: &BookTags,
    requested: &[String],
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    let genres: Vec<String> = if !requested.is_empty() {
        requested.to_vec()
    } else if !current.is_set(TagField::Genre) {
        prompter.choose_genres(GENRES)?
    } else {
        return Ok(());
    };

    if !genres.is_empty() {
        plan.set_text(TagField::Genre, genres.join(TAG_DELIMITER.to_string().as_str()));
    }
    Ok(())
}

fn ask_series_part(prompter: &mut dyn Prompter) -> io::Result<Option<String>> {
    loop {
        let raw = prompter.input("Enter series part number: ")?;
        if raw.is_empty() {
            return Ok(None);
        }
        match parse_series_part(&raw) {
            Some(part) => return Ok(Some(format_series_part(part))),
            None => prompter.say(&format!("'{raw}' is not a number, try again."))?,
        }
    }
}

fn plan_series(
    plan: &mut TagUpdatePlan,
    current: &BookTags,
    request: &TagRequest,
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    let tag_name = current.get(TagField::SeriesName);
    let tag_part = current.get(TagField::SeriesPart);
    let name = non_blank(request.series_name.as_deref());

    match (name, request.series_part) {
        (Some(name), Some(part)) => {
            plan.set_text(TagField::SeriesName, name);
            plan.set_text(TagField::SeriesPart, format_series_part(part));
        }
        (Some(name), None) => {
            plan.set_text(TagField::SeriesName, name);
            if tag_part.is_none() {
                prompter.say("Series name given, but the file has no series part number.")?;
                if let Some(part) = ask_series_part(prompter)? {
                    plan.set_text(TagField::SeriesPart, part);
                }
            }
        }
        (None, Some(part)) => {
            plan.set_text(TagField::SeriesPart, format_series_part(part));
            if tag_name.is_none() {
                prompter.say("Series part given, but the file has no series name.")?;
                let name = prompter.input("Enter series name: ")?;
                if !name.is_empty() {
                    plan.set_text(TagField::SeriesName, name);
                }
            }
        }
        (None, None) => match (tag_name, tag_part) {
            (Some(_), Some(_)) => {}
            (Some(_), None) => {
                if let Some(part) = ask_series_part(prompter)? {
                    plan.set_text(TagField::SeriesPart, part);
                }
            }
            (None, Some(_)) => {
                let name = prompter.input("Enter series name: ")?;
                if !name.is_empty() {
                    plan.set_text(TagField::SeriesName, name);
                }
            }
            (None, None) => {
                if prompter.confirm("Do you want to set series tags?")? {
                    let name = prompter.input("Enter series name: ")?;
                    if !name.is_empty() {
                        plan.set_text(TagField::SeriesName, name);
                    }
                    if let Some(part) = ask_series_part(prompter)? {
                        plan.set_text(TagField::SeriesPart, part);
                    }
                }
            }
        },
    }
    Ok(())
}

fn fill_if_unset(
    plan: &mut TagUpdatePlan,
    current: &BookTags,
    field: TagField,
    requested: Option<&str>,
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    if current.is_set(field) {
        return Ok(());
    }
    if let Some(value) = non_blank(requested) {
        plan.set_text(field, value);
        return Ok(());
    }
    let value = prompter.input(&format!("Enter {field}: "))?;
    if !value.is_empty() {
        plan.set_text(field, value);
    }
    Ok(())
}

/// Let the user change arbitrary fields by name until they enter nothing.
///
/// Mirrored pairs are always changed together.
pub fn amend_plan(
    plan: &mut TagUpdatePlan,
    current: &BookTags,
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    loop {
        let raw = prompter
            .input("Enter tag name to change (e.g. 'ALBUM'), or 'enter' to continue: ")?;
        if raw.is_empty() {
            return Ok(());
        }
        let field: TagField = match raw.parse() {
            Ok(field) => field,
            Err(e) => {
                warn!("{e}");
                continue;
            }
        };

        if field == TagField::Cover {
            let path = prompter.input("Enter path to cover image: ")?;
            if path.is_empty() {
                continue;
            }
            match Cover::from_path(Path::new(&path)) {
                Ok(cover) => plan.set_cover(cover),
                Err(e) => warn!("{e}"),
            }
            continue;
        }

        let preview = plan.applied_to(current);
        match preview.get(field) {
            Some(value) => prompter.say(&format!("Current value for '{field}': {value}"))?,
            None => prompter.say(&format!("Tag '{field}' is empty."))?,
        }

        let value = prompter.input(&format!("Enter new value for '{field}' or 'Enter' to abort: "))?;
        if value.is_empty() {
            prompter.say("Aborted.")?;
            continue;
        }
        if field == TagField::SeriesPart {
            match parse_series_part(&value) {
                Some(part) => plan.set_text(field, format_series_part(part)),
                None => warn!("'{value}' is not a valid series part number"),
            }
            continue;
        }
        plan.set_mirrored(field, &value);
    }
}

/// Something `tags verify` found wrong with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing(TagField),
    Mismatch {
        field: TagField,
        mirror: TagField,
    },
    /// `field` is empty while its counterpart `mirror` holds a value.
    HalfSet {
        field: TagField,
        mirror: TagField,
    },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing(field) => write!(f, "{field} is not set"),
            Problem::Mismatch { field, mirror } => write!(f, "{field} does not match {mirror}"),
            Problem::HalfSet { field, mirror } => write!(f, "{field} is empty but {mirror} is set"),
        }
    }
}

const MIRRORED: [TagField; 3] = [TagField::Artist, TagField::TrackTitle, TagField::Description];

/// Missing required fields and mirrored pairs that are half-filled or disagree.
///
/// A required field whose mirror holds a value is reported as half-set, not missing.
pub fn verify(tags: &BookTags) -> Vec<Problem> {
    let mut problems = Vec::new();
    for field in TagField::REQUIRED {
        let present = tags.is_set(field) || field.mirror().is_some_and(|m| tags.is_set(m));
        if !present {
            problems.push(Problem::Missing(field));
        }
    }
    for field in MIRRORED {
        let Some(mirror) = field.mirror() else {
            continue;
        };
        match (tags.get(field), tags.get(mirror)) {
            (Some(a), Some(b)) if a != b => problems.push(Problem::Mismatch { field, mirror }),
            (Some(_), None) => problems.push(Problem::HalfSet {
                field: mirror,
                mirror: field,
            }),
            (None, Some(_)) => problems.push(Problem::HalfSet { field, mirror }),
            _ => {}
        }
    }
    problems
}

/// Copy the present side of each half-filled mirrored pair onto the missing side.
pub fn fix_plan(tags: &BookTags) -> TagUpdatePlan {
    let mut plan = TagUpdatePlan::new();
    for field in MIRRORED {
        let Some(mirror) = field.mirror() else {
            continue;
        };
        match (tags.get(field), tags.get(mirror)) {
            (Some(value), None) => plan.set_text(mirror, value),
            (None, Some(value)) => plan.set_text(field, value),
            _ => {}
        }
    }
    plan
}
