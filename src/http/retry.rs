//! Rate-limit backoff policy for throttled (HTTP 429) responses.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Default number of attempts per request, including the first one.
pub const DEFAULT_MAX_RETRY: usize = 3;

/// Default ceiling on a single server-requested backoff.
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_secs(5);

/// Where a request execution stands after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// A request is about to be sent.
    Attempting,
    /// The server throttled us; wait this long, then attempt again.
    ThrottledRetry(Duration),
    /// The last response is final and goes to classification.
    Done,
}

/// Bounds on how the client reacts to throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed per request.
    pub max_retry: usize,
    /// Longest `Retry-After` the client is willing to honour.
    pub max_sleep: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            max_sleep: DEFAULT_MAX_SLEEP,
        }
    }
}

impl RetryPolicy {
    /// Decides the next state after `attempts` completed attempts produced
    /// `status` and `headers`.
    ///
    /// Only a 429 whose `Retry-After` is a positive whole number of seconds
    /// within `max_sleep` is retried, and only while attempts remain.
    pub fn next_state(
        &self,
        attempts: usize,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> DispatchState {
        if status != StatusCode::TOO_MANY_REQUESTS || attempts >= self.max_retry {
            return DispatchState::Done;
        }

        match retry_after_secs(headers) {
            Some(secs) if secs > 0 && Duration::from_secs(secs) <= self.max_sleep => {
                DispatchState::ThrottledRetry(Duration::from_secs(secs))
            }
            _ => DispatchState::Done,
        }
    }
}

/// Parses `Retry-After` as integer seconds. HTTP-date values are not honoured.
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}
