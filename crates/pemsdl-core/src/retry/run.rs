//! Retry loop: pause, attempt, and interpret the outcome until done.

use super::outcome::AttemptOutcome;
use super::policy::{RetryDecision, RetryPolicy};
use crate::error::RunError;

/// Runs `attempt_fn` (given the 1-based attempt number) until it succeeds,
/// reports a fatal failure, or the policy's attempt budget is spent.
///
/// `file_name` only labels log lines and the `RetryExhausted` error.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    file_name: &str,
    mut attempt_fn: F,
) -> Result<T, RunError>
where
    F: FnMut(u32) -> AttemptOutcome<T>,
{
    let mut attempt = 1u32;
    loop {
        let pause = policy.pause();
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }

        match attempt_fn(attempt) {
            AttemptOutcome::Success(v) => return Ok(v),
            AttemptOutcome::Fatal(e) => return Err(e),
            AttemptOutcome::Retryable(e) => match policy.decide(attempt) {
                RetryDecision::Retry => {
                    tracing::warn!(
                        attempt,
                        "error retrieving {}, retrying: {}",
                        file_name,
                        e
                    );
                    attempt += 1;
                }
                RetryDecision::NoRetry => {
                    tracing::error!(
                        "could not retrieve {} after {} tries: {}",
                        file_name,
                        attempt,
                        e
                    );
                    return Err(RunError::RetryExhausted {
                        file_name: file_name.to_string(),
                        attempts: attempt,
                        last: e,
                    });
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::path::PathBuf;
    use std::time::Duration;

    fn quick() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            politeness_delay: Duration::ZERO,
        }
    }

    #[test]
    fn succeeds_on_fifth_attempt() {
        let mut seen = Vec::new();
        let out = run_with_retry(&quick(), "f.txt", |attempt| {
            seen.push(attempt);
            if attempt < 5 {
                AttemptOutcome::Retryable(FetchError::Http(500))
            } else {
                AttemptOutcome::Success(attempt)
            }
        })
        .unwrap();
        assert_eq!(out, 5);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn gives_up_after_five_attempts() {
        let mut calls = 0;
        let err = run_with_retry::<(), _>(&quick(), "f.txt", |_| {
            calls += 1;
            AttemptOutcome::Retryable(FetchError::Http(503))
        })
        .unwrap_err();
        assert_eq!(calls, 5);
        match err {
            RunError::RetryExhausted {
                file_name,
                attempts,
                last,
            } => {
                assert_eq!(file_name, "f.txt");
                assert_eq!(attempts, 5);
                assert!(matches!(last, FetchError::Http(503)));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }

    #[test]
    fn fatal_stops_immediately() {
        let mut calls = 0;
        let err = run_with_retry::<(), _>(&quick(), "f.txt", |_| {
            calls += 1;
            AttemptOutcome::Fatal(RunError::Finalize {
                temp: PathBuf::from("f.txt.download_in_progress"),
                source: std::io::Error::other("cross-device link"),
            })
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, RunError::Finalize { .. }));
    }
}
