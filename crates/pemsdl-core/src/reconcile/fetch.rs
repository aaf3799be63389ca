//! One download attempt: stream into the temp file, then rename into place.

use super::plan::DownloadJob;
use crate::error::{FetchError, RunError};
use crate::portal::Portal;
use crate::retry::AttemptOutcome;
use crate::storage::StorageWriter;

/// Returns the number of bytes now at the final path on success.
///
/// Transfer and write failures are retryable; the temp file they leave
/// behind is truncated by the next attempt. A failed rename is fatal.
pub fn attempt_download<P: Portal + ?Sized>(
    portal: &mut P,
    job: &DownloadJob,
    attempt: u32,
) -> AttemptOutcome<u64> {
    tracing::debug!(attempt, url = %job.file.url, "fetching {}", job.file.file_name);

    let mut writer = match StorageWriter::create(&job.temp_path) {
        Ok(w) => w,
        Err(e) => return AttemptOutcome::Retryable(FetchError::Storage(e)),
    };
    if let Err(e) = portal.fetch(&job.file.url, &mut writer) {
        return AttemptOutcome::Retryable(e);
    }
    if let Err(e) = writer.sync() {
        return AttemptOutcome::Retryable(FetchError::Storage(e));
    }

    let written = writer.written();
    match writer.finalize(&job.final_path) {
        Ok(()) => AttemptOutcome::Success(written),
        Err(source) => AttemptOutcome::Fatal(RunError::Finalize {
            temp: job.temp_path.clone(),
            source,
        }),
    }
}
