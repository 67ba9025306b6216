//! Single-page fetch with bounded retries and escalating timeouts.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::models::{order::RemoteOrderRecord, request_params::PageQuery};
use crate::providers::woo_rest::transport::Transport;

/// Retry policy for one page: a fixed attempt ceiling and a per-attempt
/// timeout that grows by `step` on every retry.
#[derive(Clone, Copy, Debug)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_timeout: Duration,
    pub step: Duration,
}

impl RetrySettings {
    pub fn new(max_attempts: u32, base_timeout: Duration, step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_timeout,
            step,
        }
    }

    /// Timeout for the zero-based `attempt`; strictly increasing when
    /// `step` is non-zero.
    fn timeout_for(&self, attempt: u32) -> Duration {
        self.base_timeout + self.step * attempt
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(10), Duration::from_secs(5))
    }
}

/// Fetches one page, never letting a failure escape its boundary: every
/// exhausted or permanent error is logged and downgraded to an empty
/// page.
pub struct RetryingPageFetcher<T: Transport> {
    transport: T,
    retry: RetrySettings,
}

impl<T: Transport> RetryingPageFetcher<T> {
    pub fn new(transport: T, retry: RetrySettings) -> Self {
        Self { transport, retry }
    }

    pub async fn fetch_page(&self, query: &PageQuery) -> Vec<RemoteOrderRecord> {
        let mut attempt = 0;
        loop {
            let timeout = self.retry.timeout_for(attempt);
            match self.transport.get_orders(query, timeout).await {
                Ok(records) => {
                    debug!(page = query.page, count = records.len(), "fetched page");
                    return records;
                }
                Err(err) if err.is_transient() => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        error!(
                            page = query.page,
                            attempts = self.retry.max_attempts,
                            %err,
                            "transient failures exhausted retry budget, treating page as empty"
                        );
                        return Vec::new();
                    }
                    warn!(
                        page = query.page,
                        attempt,
                        next_timeout_secs = self.retry.timeout_for(attempt).as_secs(),
                        %err,
                        "transient fetch failure, retrying with longer timeout"
                    );
                }
                Err(err) => {
                    error!(page = query.page, %err, "unrecoverable fetch failure, treating page as empty");
                    return Vec::new();
                }
            }
        }
    }
}
