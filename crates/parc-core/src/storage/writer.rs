//! Sequential writer for temp download files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Bytes kept from the start of the stream for content sniffing.
const HEAD_LEN: usize = 64;

/// Writer for a `.part` file. Streams chunks sequentially, counts bytes and
/// keeps the first few bytes so the caller can sniff the content type before
/// choosing the final name.
pub struct StorageWriter {
    file: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
    head: Vec<u8>,
}

impl StorageWriter {
    /// Create a new temp file at `temp_path` (e.g. `destination.part`).
    /// Overwrites if the path already exists.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(StorageWriter {
            file: BufWriter::new(file),
            temp_path: temp_path.to_path_buf(),
            written: 0,
            head: Vec::with_capacity(HEAD_LEN),
        })
    }

    /// Append `data` to the file.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        if self.head.len() < HEAD_LEN {
            let take = (HEAD_LEN - self.head.len()).min(data.len());
            self.head.extend_from_slice(&data[..take]);
        }
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// First bytes of the stream (up to 64).
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    /// Flush buffers and sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()
    }

    /// Atomically rename the temp file to the final path, replacing any
    /// existing file. Consumes the writer and closes the file.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let StorageWriter {
            file, temp_path, ..
        } = self;
        file.into_inner().map_err(|e| e.into_error())?;
        std::fs::rename(&temp_path, final_path)
    }

    /// Close and delete the temp file (best effort).
    pub fn discard(self) {
        let StorageWriter {
            file, temp_path, ..
        } = self;
        drop(file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), error = %e, "could not remove temp file");
        }
    }
}
