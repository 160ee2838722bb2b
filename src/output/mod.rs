//! Output formatting and persistence.

pub mod archive;
mod json;
mod terminal;

pub use archive::{load, save, ArrayRecord, ResultArchive, ARCHIVE_VERSION};
pub use json::{to_json, to_json_pretty};
pub use terminal::format_threshold;
