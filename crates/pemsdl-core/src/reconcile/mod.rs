//! Download reconciliation: make the output directory hold every listed file.
//!
//! For each district and year, in order: list the remote files, validate the
//! whole listing, drop files dated after the cutoff, skip files already on
//! disk, and fetch the rest one at a time with retries. Any fatal error ends
//! the run; the "final file exists" check makes a rerun pick up where it stopped.

mod fetch;
mod plan;

pub use fetch::attempt_download;
pub use plan::{plan, DownloadJob, Plan};

use crate::catalog::{Cutoff, RemoteFile};
use crate::config::PemsConfig;
use crate::error::RunError;
use crate::portal::Portal;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::{self, LocalState};
use std::path::{Path, PathBuf};

/// What to walk and how.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub districts: Vec<u32>,
    pub years: Vec<i32>,
    /// Clearinghouse data type, e.g. `station_5min`.
    pub data_type: String,
    pub cutoff: Cutoff,
    pub retry: RetryPolicy,
}

impl RunSettings {
    pub fn from_config(cfg: &PemsConfig, data_type: &str) -> Self {
        RunSettings {
            districts: cfg.districts.clone(),
            years: cfg.years.clone(),
            data_type: data_type.to_string(),
            cutoff: Cutoff::new(cfg.cutoff),
            retry: RetryPolicy::from_config(cfg.retry.as_ref()),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub listed: u64,
    pub downloaded: u64,
    pub skipped_existing: u64,
    pub size_mismatches: u64,
    pub after_cutoff: u64,
}

/// Run context: the only portal, the settings, the output directory and the counters.
pub struct Reconciler<P: Portal> {
    portal: P,
    settings: RunSettings,
    output_dir: PathBuf,
    stats: RunStats,
}

impl<P: Portal> Reconciler<P> {
    pub fn new(portal: P, settings: RunSettings, output_dir: impl Into<PathBuf>) -> Self {
        Reconciler {
            portal,
            settings,
            output_dir: output_dir.into(),
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn portal(&self) -> &P {
        &self.portal
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Walks every district/year pair in order.
    pub fn run(&mut self) -> Result<RunStats, RunError> {
        storage::ensure_output_dir(&self.output_dir)?;
        tracing::info!("saving output to {}", self.output_dir.display());

        let districts = self.settings.districts.clone();
        let years = self.settings.years.clone();
        for district in districts {
            for &year in &years {
                self.reconcile_pair(district, year)?;
            }
        }

        let s = self.stats;
        tracing::info!(
            skipped_existing = s.skipped_existing,
            size_mismatches = s.size_mismatches,
            after_cutoff = s.after_cutoff,
            "Downloaded {} files",
            s.downloaded
        );
        Ok(s)
    }

    /// Lists, validates, plans and fetches one district/year.
    pub fn reconcile_pair(&mut self, district: u32, year: i32) -> Result<(), RunError> {
        tracing::info!("District {}, {}", district, year);
        let listing = self
            .portal
            .list_files(district, year, &self.settings.data_type)?;
        if listing.is_empty() {
            tracing::info!("no files listed for district {}, {}", district, year);
            return Ok(());
        }

        // Validate everything before touching the network again, so a schema
        // change aborts the run without a single download.
        let base = self.portal.base_url().clone();
        let files = listing
            .into_files()
            .map(|raw| RemoteFile::from_raw(raw, &base))
            .collect::<Result<Vec<_>, _>>()?;
        self.stats.listed += files.len() as u64;

        for file in files {
            if let Some(job) = self.plan_file(file)? {
                self.download(job)?;
            }
        }
        Ok(())
    }

    fn plan_file(&mut self, file: RemoteFile) -> Result<Option<DownloadJob>, RunError> {
        let final_path = self.output_dir.join(&file.file_name);
        let local = LocalState::probe(&final_path).map_err(|source| RunError::Io {
            path: final_path.clone(),
            source,
        })?;

        match plan(&file, &self.settings.cutoff, local) {
            Plan::AfterCutoff => {
                tracing::debug!("{} is dated after the cutoff, skipping", file.file_name);
                self.stats.after_cutoff += 1;
                Ok(None)
            }
            Plan::Present => {
                tracing::info!(
                    "{} already exists in output directory, skipping",
                    file.file_name
                );
                self.stats.skipped_existing += 1;
                Ok(None)
            }
            Plan::SizeMismatch { local, declared } => {
                tracing::warn!(
                    local,
                    declared,
                    "{} already exists with a different size, skipping",
                    file.file_name
                );
                self.stats.skipped_existing += 1;
                self.stats.size_mismatches += 1;
                Ok(None)
            }
            Plan::Fetch => Ok(Some(DownloadJob::new(file, &self.output_dir))),
        }
    }

    fn download(&mut self, job: DownloadJob) -> Result<(), RunError> {
        let portal = &mut self.portal;
        let written = run_with_retry(&self.settings.retry, &job.file.file_name, |attempt| {
            attempt_download(&mut *portal, &job, attempt)
        })?;
        self.stats.downloaded += 1;

        if written != job.file.byte_size {
            tracing::warn!(
                written,
                declared = job.file.byte_size,
                "{} downloaded with a size different from the listing",
                job.file.file_name
            );
        } else {
            tracing::debug!(bytes = written, "saved {}", job.final_path.display());
        }
        Ok(())
    }
}
