//! Source discovery: turns a `--source` argument into the list of files a
//! command works on.

mod scan;

pub use scan::{ScanError, collect_files, has_extension};
