//! Disk I/O and file lifecycle.
//!
//! Downloads are streamed into `<final>.download_in_progress` and renamed
//! into place only once the transfer completed, so a final path is either a
//! complete file or absent.

use crate::error::RunError;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".download_in_progress";

/// What is currently on disk at a final path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    Absent,
    Present { size: u64 },
}

impl LocalState {
    /// Looks at `path` only; a sibling temp file does not count as present.
    pub fn probe(path: &Path) -> io::Result<Self> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(LocalState::Present { size: meta.len() }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LocalState::Absent),
            Err(e) => Err(e),
        }
    }
}

/// Sequential writer for one download attempt.
pub struct StorageWriter {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create the temp file at `temp_path`, truncating whatever an earlier
    /// attempt or an aborted run left there.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(StorageWriter {
            file,
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    /// Bytes written so far in this attempt.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    /// Atomically rename the temp file to the final path. Consumes the writer and closes the file.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let temp_path = self.temp_path;
        drop(self.file);
        std::fs::rename(&temp_path, final_path)
    }
}

impl Write for StorageWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Path for the temp file: appends the in-progress suffix to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Make sure the flat output directory exists.
pub fn ensure_output_dir(dir: &Path) -> Result<(), RunError> {
    std::fs::create_dir_all(dir).map_err(|source| RunError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
