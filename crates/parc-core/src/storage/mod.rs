//! Disk I/O and file lifecycle.
//!
//! Transfers stream into `<final>.part` and are renamed into place only after
//! the byte count checks out, so an interrupted transfer never leaves a file
//! at the canonical path that a later size probe could mistake for a complete
//! one.

mod writer;

pub use writer::StorageWriter;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.iso` → `file.iso.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Writes `bytes` to `final_path` through a temp file and rename.
/// Creates parent directories as needed.
pub fn write_atomically(final_path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = final_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tp = temp_path(final_path);
    let mut f = std::fs::File::create(&tp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    drop(f);
    std::fs::rename(&tp, final_path)
}
