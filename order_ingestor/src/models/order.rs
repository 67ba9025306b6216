//! Upstream order payload model.
//!
//! Mirrors the remote API's order JSON, limited to the fields the sync
//! core actually consumes. Everything here is read-only to this system:
//! the same identifier may arrive again on later fetches with a different
//! status or metadata, and reconciliation downstream decides what to do
//! with it.

use serde::Deserialize;

/// Upstream meta key carrying the dispatch date.
pub const META_DISPATCH_DATE: &str = "datei";
/// Upstream meta key carrying the postal tracking code.
pub const META_TRACKING_CODE: &str = "marsule";
/// Upstream meta key carrying the delivery date.
pub const META_DELIVERY_DATE: &str = "datedeliver";
/// Upstream meta key carrying the customer birthday (checkout form field).
pub const META_BIRTHDAY: &str = "_billing_field_529";

/// One order as returned by the remote collection endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteOrderRecord {
    /// Stable upstream identifier; the ledger's primary key.
    pub id: u64,

    /// Enum-like status string (`processing`, `completed`, ...). Values
    /// outside the known set must pass through without crashing.
    pub status: String,

    /// ISO-8601 paid timestamp, site-local, absent until payment.
    #[serde(default)]
    pub date_paid: Option<String>,

    #[serde(default)]
    pub customer_id: u64,

    #[serde(default)]
    pub billing: BillingInfo,

    #[serde(default)]
    pub shipping: ShippingInfo,

    /// Order total in the upstream's native minor currency unit, as a
    /// decimal string.
    #[serde(default)]
    pub total: String,

    #[serde(default)]
    pub discount_total: String,

    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,

    /// Free-form key/value metadata. Key presence is never assumed; use
    /// [`RemoteOrderRecord::meta_text`].
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,

    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl RemoteOrderRecord {
    /// Looks up a metadata value by key.
    ///
    /// String and numeric values stringify; anything else (objects,
    /// arrays, null) is treated as absent. Not found is `None`, never an
    /// error.
    pub fn meta_text(&self, key: &str) -> Option<String> {
        self.meta_data
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| match &entry.value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

/// Billing contact sub-object.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BillingInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Shipping destination sub-object.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ShippingInfo {
    /// Region code (e.g. `THR`), mapped to a display name downstream.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub postcode: String,
}

/// One shipping charge line; only the amount is consumed.
#[derive(Clone, Debug, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub total: String,
}

/// One free-form metadata entry.
#[derive(Clone, Debug, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// One purchased line item.
#[derive(Clone, Debug, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    /// Line total in upstream minor units, as a decimal string.
    #[serde(default)]
    pub total: String,
}
