//! Result of a single transfer attempt.

use crate::error::{FetchError, RunError};

/// What one attempt came to; the retry loop decides what happens next.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The attempt finished; stop retrying.
    Success(T),
    /// The attempt failed in a way another attempt may fix.
    Retryable(FetchError),
    /// The attempt failed in a way that ends the run immediately.
    Fatal(RunError),
}

impl<T> AttemptOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}
