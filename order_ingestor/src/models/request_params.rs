//! Page request parameters.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Specifier for one page of the remote order collection.
///
/// `after` is the lower-bound paid/created timestamp in the upstream's
/// site-local ISO-8601 form; `page` is 1-based.
#[derive(Clone, Debug, Serialize)]
pub struct PageQuery {
    pub after: String,
    pub per_page: u32,
    pub page: u32,
}

impl PageQuery {
    pub fn new(after: NaiveDateTime, per_page: u32, page: u32) -> Self {
        Self {
            after: after.format("%Y-%m-%dT%H:%M:%S").to_string(),
            per_page,
            page,
        }
    }
}
