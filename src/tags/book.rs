use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::error::TagError;
use super::field::{TAG_DELIMITER, TagField};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoverFormat {
    Png,
    Jpeg,
}

impl CoverFormat {
    /// Only `.png`, `.jpg` and `.jpeg` are accepted.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(CoverFormat::Png),
            "jpg" | "jpeg" => Some(CoverFormat::Jpeg),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoverFormat::Png => "png",
            CoverFormat::Jpeg => "jpeg",
        }
    }
}

/// An embedded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub format: CoverFormat,
    pub data: Vec<u8>,
}

impl Cover {
    pub fn from_path(path: &Path) -> Result<Self, TagError> {
        let format =
            CoverFormat::from_path(path).ok_or_else(|| TagError::UnsupportedCover(path.to_path_buf()))?;
        let data = fs::read(path).map_err(|source| TagError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { format, data })
    }
}

/// In-memory view of an audiobook's metadata.
///
/// Text fields hold the raw single value stored in the container; fields that
/// carry several names (authors, genres) keep them `;`-joined, see [`BookTags::names`].
/// Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookTags {
    text: BTreeMap<TagField, String>,
    cover: Option<Cover>,
}

impl BookTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text value of `field`. Always `None` for [`TagField::Cover`].
    pub fn get(&self, field: TagField) -> Option<&str> {
        self.text.get(&field).map(String::as_str)
    }

    /// Set a text field; blank values clear it. Setting `Cover` is ignored.
    pub fn set(&mut self, field: TagField, value: impl Into<String>) {
        if field == TagField::Cover {
            return;
        }
        let value = value.into();
        if value.trim().is_empty() {
            self.text.remove(&field);
        } else {
            self.text.insert(field, value);
        }
    }

    pub fn remove(&mut self, field: TagField) {
        if field == TagField::Cover {
            self.cover = None;
        } else {
            self.text.remove(&field);
        }
    }

    pub fn is_set(&self, field: TagField) -> bool {
        match field {
            TagField::Cover => self.cover.is_some(),
            _ => self.text.contains_key(&field),
        }
    }

    /// The `;`-separated entries of `field`, trimmed, blanks dropped.
    pub fn names(&self, field: TagField) -> Vec<&str> {
        self.get(field)
            .map(|v| {
                v.split(TAG_DELIMITER)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }

    pub fn set_cover(&mut self, cover: Option<Cover>) {
        self.cover = cover;
    }

    /// Text fields in [`TagField`] order.
    pub fn text_fields(&self) -> impl Iterator<Item = (TagField, &str)> {
        self.text.iter().map(|(f, v)| (*f, v.as_str()))
    }
}
