//! Audiobook metadata: the fields the tool knows about, how they are stored
//! in MP4 atoms, and how updates are planned.

mod book;
mod display;
mod error;
mod field;
mod plan;
mod store;

pub use book::{BookTags, Cover, CoverFormat};
pub use display::render;
pub use error::TagError;
pub use field::{GENRES, TAG_DELIMITER, TagField, UnknownTagField, canonical_genre};
pub use plan::{
    NoInput, Problem, Prompter, TagRequest, TagUpdatePlan, TagValue, amend_plan, fix_plan,
    format_series_part, plan_updates, verify,
};
pub use store::{LoftyStore, TagStore};
