//! Provider abstraction for order sources.
//!
//! [`OrderSource`] is the unified interface for pulling the full set of
//! recently-changed orders from a remote store. The one concrete
//! implementation lives in [`woo_rest`]; the trait exists so callers (and
//! tests) can swap in fakes via dynamic dispatch.

pub mod errors;
pub mod woo_rest;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{errors::Error, models::order::RemoteOrderRecord};

#[async_trait]
pub trait OrderSource {
    /// Fetches every order paid/modified at or after `after`.
    ///
    /// The result order is unspecified; callers sort by identifier before
    /// reconciling. Per-page failures are downgraded inside the provider,
    /// so a partially-failing upstream yields a partial batch, not an
    /// error.
    async fn fetch_since(&self, after: NaiveDateTime) -> Result<Vec<RemoteOrderRecord>, Error>;
}
