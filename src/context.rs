//! Cancellation and deadlines for a single API call.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Governs one request execution.
///
/// Every suspension point of a call (sending, reading the body, backing off
/// after a 429) is raced against the context. Cancelling the token fails the
/// call with [`Error::Canceled`]; passing the deadline fails it with
/// [`Error::Timeout`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never cancels and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that is cancelled through [`RequestContext::cancel`] or its token.
    pub fn with_cancel() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now. A timeout too large to
    /// represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Derives a child context: cancelled when the parent is, and bounded by
    /// the earlier of the two deadlines.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reports why the context is done, if it is.
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::Timeout),
            _ => None,
        }
    }

    /// Completes when the context is cancelled or its deadline passes,
    /// yielding the matching error.
    pub async fn done(&self) -> Error {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Error::Canceled,
                    _ = tokio::time::sleep_until(deadline) => Error::Timeout,
                }
            }
            None => {
                self.token.cancelled().await;
                Error::Canceled
            }
        }
    }

    /// Runs `fut` unless the context finishes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }

    /// Sleeps for `duration` unless the context finishes first.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}
