//! Request execution with rate-limit aware retries.

mod client;
mod retry;

pub use client::{BaseApi, Client, USER_AGENT};
pub use retry::{
    DEFAULT_MAX_RETRY, DEFAULT_MAX_SLEEP, DispatchState, RetryPolicy, retry_after_secs,
};
