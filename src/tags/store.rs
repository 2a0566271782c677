use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{ItemKey, ItemValue, Tag, TagExt, TagItem};
use tracing::debug;

use super::book::{BookTags, Cover, CoverFormat};
use super::error::TagError;
use super::field::TagField;

/// Where tags are read from and saved to.
pub trait TagStore {
    fn read(&self, path: &Path) -> Result<BookTags, TagError>;
    fn write(&self, path: &Path, tags: &BookTags) -> Result<(), TagError>;
}

/// [`TagStore`] backed by the file's own MP4 atoms.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyStore;

fn item_key(field: TagField) -> Option<ItemKey> {
    let key = match field {
        TagField::Album => ItemKey::AlbumTitle,
        TagField::AlbumArtist => ItemKey::AlbumArtist,
        TagField::Artist => ItemKey::TrackArtist,
        TagField::Comment => ItemKey::Comment,
        TagField::Cover => return None,
        TagField::Description => ItemKey::Description,
        TagField::Genre => ItemKey::Genre,
        TagField::Narrator => ItemKey::Composer,
        TagField::SeriesName | TagField::SeriesPart => ItemKey::Unknown(field.atom().to_string()),
        TagField::TrackTitle => ItemKey::TrackTitle,
        TagField::Year => ItemKey::RecordingDate,
    };
    Some(key)
}

fn cover_from_picture(picture: &Picture) -> Option<Cover> {
    let format = match picture.mime_type()? {
        MimeType::Png => CoverFormat::Png,
        MimeType::Jpeg => CoverFormat::Jpeg,
        _ => return None,
    };
    Some(Cover {
        format,
        data: picture.data().to_vec(),
    })
}

fn picture_from_cover(cover: &Cover) -> Picture {
    let mime = match cover.format {
        CoverFormat::Png => MimeType::Png,
        CoverFormat::Jpeg => MimeType::Jpeg,
    };
    Picture::new_unchecked(PictureType::CoverFront, Some(mime), None, cover.data.clone())
}

/// Copy the tool's fields out of a lofty tag. Only the first value of each
/// item is used.
pub(super) fn book_tags_from(tag: &Tag) -> BookTags {
    let mut tags = BookTags::new();
    for field in TagField::ALL {
        let Some(key) = item_key(field) else {
            continue;
        };
        if let Some(value) = tag.get_string(&key) {
            tags.set(field, value);
        }
    }
    tags.set_cover(tag.pictures().iter().find_map(cover_from_picture));
    tags
}

/// Overwrite the tool's fields on a lofty tag; other items are left alone.
///
/// Freeform keys (`----:mean:name`) have no generic mapping, so they bypass
/// lofty's key check and become freeform atoms when the tag is saved as MP4.
/// Any other item the tag type refuses is returned as an error.
pub(super) fn apply_to_tag(tags: &BookTags, tag: &mut Tag) -> Result<(), TagField> {
    for field in TagField::ALL {
        let Some(key) = item_key(field) else {
            continue;
        };
        tag.remove_key(&key);
        let Some(value) = tags.get(field) else {
            continue;
        };
        let freeform = matches!(&key, ItemKey::Unknown(name) if name.starts_with("----:"));
        let item = TagItem::new(key, ItemValue::Text(value.to_string()));
        if freeform {
            tag.insert_unchecked(item);
        } else if !tag.push(item) {
            return Err(field);
        }
    }

    while !tag.pictures().is_empty() {
        tag.remove_picture(0);
    }
    if let Some(cover) = tags.cover() {
        tag.push_picture(picture_from_cover(cover));
    }
    Ok(())
}

impl TagStore for LoftyStore {
    fn read(&self, path: &Path) -> Result<BookTags, TagError> {
        let tagged = lofty::read_from_path(path).map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tags = tagged
            .primary_tag()
            .or_else(|| tagged.first_tag())
            .map(book_tags_from)
            .unwrap_or_default();
        debug!("Read {} tag field(s) from '{}'", tags.text_fields().count(), path.display());
        Ok(tags)
    }

    fn write(&self, path: &Path, tags: &BookTags) -> Result<(), TagError> {
        let mut tagged = lofty::read_from_path(path).map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if tagged.primary_tag().is_none() {
            let tag_type = tagged.primary_tag_type();
            tagged.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged
            .primary_tag_mut()
            .ok_or_else(|| TagError::NoTag(path.to_path_buf()))?;

        apply_to_tag(tags, tag).map_err(|field| TagError::UnsupportedField {
            path: path.to_path_buf(),
            field,
        })?;

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|source| TagError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Saved tags to '{}'", path.display());
        Ok(())
    }
}
