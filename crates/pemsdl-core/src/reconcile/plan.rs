//! Deciding what a listed file needs: nothing, or a download job.

use crate::catalog::{Cutoff, RemoteFile};
use crate::storage::{self, LocalState};
use std::path::{Path, PathBuf};

/// A remote file whose final path is absent, with the paths to fill it.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub file: RemoteFile,
    pub final_path: PathBuf,
    pub temp_path: PathBuf,
}

impl DownloadJob {
    pub fn new(file: RemoteFile, output_dir: &Path) -> Self {
        let final_path = output_dir.join(&file.file_name);
        let temp_path = storage::temp_path(&final_path);
        DownloadJob {
            file,
            final_path,
            temp_path,
        }
    }
}

/// Why a listed file is left alone or fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Dated after the cutoff.
    AfterCutoff,
    /// Final file exists with the declared size.
    Present,
    /// Final file exists but its size differs; it is kept anyway.
    SizeMismatch { local: u64, declared: u64 },
    /// Final file absent.
    Fetch,
}

/// Compares one listed file with the cutoff and the local state at its final path.
pub fn plan(file: &RemoteFile, cutoff: &Cutoff, local: LocalState) -> Plan {
    if !cutoff.includes(file) {
        return Plan::AfterCutoff;
    }
    match local {
        LocalState::Absent => Plan::Fetch,
        LocalState::Present { size } if size == file.byte_size => Plan::Present,
        LocalState::Present { size } => Plan::SizeMismatch {
            local: size,
            declared: file.byte_size,
        },
    }
}
