//! Filing audiobooks into `{root}/{author}/{title}/{author} - {title}.m4b`.
//!
//! [`resolve`] decides author and title, [`Relocator`] moves files without
//! clobbering and [`organize_files`] runs a whole batch.

mod batch;
mod relocate;
mod resolve;

pub use batch::{BatchReport, OrganizeOptions, autoname_files, organize_files};
pub use relocate::{
    Outcome, PermissionPolicy, PruneError, RelocateError, Relocator, ResolvedDestination,
    move_file, rename_in_place,
};
pub use resolve::{RejectSet, Resolution, ResolutionSource, ResolveError, parse_file_name, resolve};
