//! Retry policy for file transfers.
//!
//! Every attempt is preceded by a random politeness pause, and each attempt
//! reports an explicit `AttemptOutcome` that the loop in `run` interprets.

mod outcome;
mod policy;
mod run;

pub use outcome::AttemptOutcome;
pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
