//! CLI command handlers. Each command is in its own file.

mod archive;
mod export_links;
mod status;

pub use archive::{run_archive, ArchiveOptions};
pub use export_links::run_export_links;
pub use status::run_status;
