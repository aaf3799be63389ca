use crate::config::RetryConfig;
use std::time::Duration;

/// Decision returned by the retry policy after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; the attempt budget is spent.
    NoRetry,
    /// Try again (after the usual politeness pause).
    Retry,
}

/// Fixed attempt budget plus a random pause before every attempt.
///
/// The pause is not a backoff: the provider asks batch tools to visit links
/// serially and slowly, so the first attempt waits too.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Exclusive upper bound of the random pause before each attempt.
    pub politeness_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            politeness_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: Option<&RetryConfig>) -> Self {
        match cfg {
            Some(c) => Self {
                max_attempts: c.max_attempts.max(1),
                politeness_delay: Duration::try_from_secs_f64(c.politeness_delay_secs)
                    .unwrap_or_default(),
            },
            None => Self::default(),
        }
    }

    /// `attempt` is 1-based and is the attempt that just failed.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::NoRetry
        } else {
            RetryDecision::Retry
        }
    }

    /// Random duration in `[0, politeness_delay)`.
    pub fn pause(&self) -> Duration {
        if self.politeness_delay.is_zero() {
            return Duration::ZERO;
        }
        self.politeness_delay.mul_f64(rand::random::<f64>())
    }
}
