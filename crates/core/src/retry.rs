//! Retry policy for background jobs.
//!
//! Failed jobs are rescheduled with exponential backoff until they run out
//! of attempts, after which they are dead-lettered.

use std::time::Duration;

/// Default number of attempts before a job is dead-lettered.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// Delay before the first retry.
pub const BASE_BACKOFF: Duration = Duration::from_secs(15);

/// Upper bound for any single backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// Delay before the next attempt after `attempts` failed attempts.
///
/// `BASE_BACKOFF * 2^(attempts - 1)`, capped at [`MAX_BACKOFF`].
pub fn backoff_delay(attempts: i32) -> Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 16) as u32;
    BASE_BACKOFF
        .checked_mul(1u32 << exponent)
        .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
}

/// What to do with a job after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    DeadLetter,
}

/// Decide between retrying and dead-lettering.
///
/// `attempts` counts the attempt that just failed. Permanent failures are
/// never retried.
pub fn decide(attempts: i32, max_attempts: i32, permanent: bool) -> RetryDecision {
    if permanent || attempts >= max_attempts {
        RetryDecision::DeadLetter
    } else {
        RetryDecision::RetryAfter(backoff_delay(attempts))
    }
}
