//! REST provider for the remote order store.

mod fetcher;
mod provider;
mod transport;

pub use fetcher::{RetrySettings, RetryingPageFetcher};
pub use provider::{FetchSettings, WooProvider};
pub use transport::{HttpTransport, Transport};
