//! Merge numbered tracks into a single chaptered `.m4b`.

mod chapters;
mod error;
mod merge;
mod probe;

pub use chapters::{
    Chapter, FFMETADATA_HEADER, TIMEBASE, build_chapters, layout, parse_track_name,
    render_ffmetadata, sort_tracks,
};
pub use error::ConcatError;
pub use merge::{FILE_LIST_NAME, METADATA_NAME, MergeJob, render_file_list};
pub use probe::{DurationProbe, FfprobeProbe, LoftyProbe, parse_seconds};

#[cfg(test)]
mod tests;
