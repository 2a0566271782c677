use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separator used inside a single tag value to hold several names or genres.
pub const TAG_DELIMITER: char = ';';

/// Genres offered by `tags set`.
pub const GENRES: &[&str] = &[
    "Apocalyptic & Dystopian",
    "Art",
    "Biography & Memoir",
    "Body, Mind, & Spirit",
    "Business",
    "Children's",
    "Classics",
    "Cooking",
    "Education",
    "Environment & Nature",
    "Erotica",
    "Essays",
    "Family & Relationships",
    "Fantasy",
    "Fiction - Literary",
    "Fiction",
    "Health",
    "Historical Fiction",
    "History",
    "Horror",
    "Humor",
    "LGBTQIA+ Fiction",
    "LGBTQIA+ Nonfiction",
    "Language",
    "Law",
    "Literary Criticism",
    "Medicine",
    "Music",
    "Mystery & Thriller",
    "Nonfiction",
    "Performance",
    "Perspectives on Disability",
    "Philosophy",
    "Poetry",
    "Politics & Economy",
    "Psychology",
    "Religion",
    "Romance",
    "Science & Technology",
    "Science Fiction",
    "Self-Improvement",
    "Short Stories",
    "Social Science",
    "Sports & Recreation",
    "Travel",
    "True Crime",
    "Westerns",
    "YA Fiction",
    "YA Nonfiction",
];

/// Look up a genre from the fixed list, ignoring case.
pub fn canonical_genre(name: &str) -> Option<&'static str> {
    let name = name.trim();
    GENRES.iter().copied().find(|g| g.eq_ignore_ascii_case(name))
}

/// Every metadata field the tool reads or writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagField {
    Album,
    AlbumArtist,
    Artist,
    Comment,
    Cover,
    Description,
    Genre,
    /// Stored in the composer slot; for audiobooks that is always the narrator.
    Narrator,
    SeriesName,
    SeriesPart,
    TrackTitle,
    Year,
}

impl TagField {
    pub const ALL: [TagField; 12] = [
        TagField::Album,
        TagField::AlbumArtist,
        TagField::Artist,
        TagField::Comment,
        TagField::Cover,
        TagField::Description,
        TagField::Genre,
        TagField::Narrator,
        TagField::SeriesName,
        TagField::SeriesPart,
        TagField::TrackTitle,
        TagField::Year,
    ];

    /// Fields every finished audiobook is expected to carry.
    pub const REQUIRED: [TagField; 8] = [
        TagField::Artist,
        TagField::Narrator,
        TagField::Cover,
        TagField::Description,
        TagField::Genre,
        TagField::SeriesName,
        TagField::TrackTitle,
        TagField::Year,
    ];

    /// Name used on the command line and in listings.
    pub fn name(self) -> &'static str {
        match self {
            TagField::Album => "ALBUM",
            TagField::AlbumArtist => "ALBUM_ARTIST",
            TagField::Artist => "ARTIST",
            TagField::Comment => "COMMENT",
            TagField::Cover => "COVER",
            TagField::Description => "DESCRIPTION",
            TagField::Genre => "GENRE",
            TagField::Narrator => "NARRATOR",
            TagField::SeriesName => "SERIES_NAME",
            TagField::SeriesPart => "SERIES_PART",
            TagField::TrackTitle => "TRACK_TITLE",
            TagField::Year => "YEAR",
        }
    }

    /// The MP4 atom the field lives in.
    pub fn atom(self) -> &'static str {
        match self {
            TagField::Album => "\u{a9}alb",
            TagField::AlbumArtist => "aART",
            TagField::Artist => "\u{a9}ART",
            TagField::Comment => "\u{a9}cmt",
            TagField::Cover => "covr",
            TagField::Description => "desc",
            TagField::Genre => "\u{a9}gen",
            TagField::Narrator => "\u{a9}wrt",
            TagField::SeriesName => "----:com.apple.iTunes:SRNM",
            TagField::SeriesPart => "----:com.apple.iTunes:SRSQ",
            TagField::TrackTitle => "\u{a9}nam",
            TagField::Year => "\u{a9}day",
        }
    }

    /// The field that must always hold the same value as this one.
    pub fn mirror(self) -> Option<TagField> {
        match self {
            TagField::Artist => Some(TagField::AlbumArtist),
            TagField::AlbumArtist => Some(TagField::Artist),
            TagField::TrackTitle => Some(TagField::Album),
            TagField::Album => Some(TagField::TrackTitle),
            TagField::Description => Some(TagField::Comment),
            TagField::Comment => Some(TagField::Description),
            TagField::Cover
            | TagField::Genre
            | TagField::Narrator
            | TagField::SeriesName
            | TagField::SeriesPart
            | TagField::Year => None,
        }
    }
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tag '{0}'")]
pub struct UnknownTagField(pub String);

impl FromStr for TagField {
    type Err = UnknownTagField;

    /// Accepts `ALBUM_ARTIST`, `album-artist` or `album artist`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        TagField::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| UnknownTagField(s.to_string()))
    }
}
