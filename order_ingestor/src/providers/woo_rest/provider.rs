//! Concurrent paginator over the retrying page fetcher.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::info;

use crate::errors::Error;
use crate::models::{order::RemoteOrderRecord, request_params::PageQuery};
use crate::providers::OrderSource;
use crate::providers::errors::ProviderInitError;
use crate::providers::woo_rest::fetcher::{RetrySettings, RetryingPageFetcher};
use crate::providers::woo_rest::transport::{HttpTransport, Transport};

/// Pagination settings: page size and the fixed page-count ceiling.
#[derive(Clone, Copy, Debug)]
pub struct FetchSettings {
    pub per_page: u32,
    pub max_pages: u32,
}

/// Order source backed by the store's REST collection endpoint.
///
/// All pages up to the ceiling are requested eagerly and concurrently; an
/// empty page does not cancel its siblings. Results merge append-only
/// into one unordered batch, each task filling its own page's slot.
pub struct WooProvider<T: Transport> {
    fetcher: RetryingPageFetcher<T>,
    settings: FetchSettings,
}

impl WooProvider<HttpTransport> {
    /// Builds a provider over an HTTPS transport with credentials from
    /// the environment.
    pub fn from_env(
        base_url: &str,
        retry: RetrySettings,
        settings: FetchSettings,
    ) -> Result<Self, ProviderInitError> {
        let transport = HttpTransport::from_env(base_url)?;
        Ok(Self::new(transport, retry, settings))
    }
}

impl<T: Transport> WooProvider<T> {
    pub fn new(transport: T, retry: RetrySettings, settings: FetchSettings) -> Self {
        Self {
            fetcher: RetryingPageFetcher::new(transport, retry),
            settings,
        }
    }
}

#[async_trait]
impl<T: Transport> OrderSource for WooProvider<T> {
    async fn fetch_since(&self, after: NaiveDateTime) -> Result<Vec<RemoteOrderRecord>, Error> {
        let queries: Vec<PageQuery> = (1..=self.settings.max_pages)
            .map(|page| PageQuery::new(after, self.settings.per_page, page))
            .collect();

        let pages = join_all(queries.iter().map(|query| self.fetcher.fetch_page(query))).await;

        let mut merged = Vec::new();
        for page in pages {
            merged.extend(page);
        }
        info!(
            pages = self.settings.max_pages,
            records = merged.len(),
            %after,
            "merged paginated fetch"
        );
        Ok(merged)
    }
}
