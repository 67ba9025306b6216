//! Hand-off to the external mail-merge collaborator.
//!
//! The templating side receives a flat field-name → value mapping per
//! row and performs its own text substitution; nothing here touches
//! documents. Field values come straight out of ledger cells, which are
//! already normalized at projection time.

use indexmap::IndexMap;

use crate::ledger::{Cell, LedgerStore};
use crate::schema::{ColumnKey, Schema};

/// Builds the merge mapping for one data row: billing name, the combined
/// region + street address, normalized phone and postcode.
pub fn merge_fields(schema: &Schema, separator: &str, row: &[Cell]) -> IndexMap<String, String> {
    let field = |key: ColumnKey| row[schema.position(key)].to_field();

    let region_city = field(ColumnKey::RegionCity);
    let street = field(ColumnKey::Address);
    let address = if street.is_empty() {
        region_city
    } else {
        format!("{region_city}{separator}{street}")
    };

    IndexMap::from([
        ("billing_name".to_string(), field(ColumnKey::BillingName)),
        ("address".to_string(), address),
        ("phone".to_string(), field(ColumnKey::Phone)),
        ("postcode".to_string(), field(ColumnKey::Postcode)),
    ])
}

/// Merge mappings for every data row whose status cell matches
/// `status_label` (typically the "processing" label).
pub fn merge_fields_for_status(store: &LedgerStore, status_label: &str) -> Vec<IndexMap<String, String>> {
    let schema = store.schema();
    let status_pos = schema.position(ColumnKey::Status);
    store
        .data_rows()
        .filter(|row| {
            row[status_pos]
                .as_text()
                .is_some_and(|status| status.trim() == status_label)
        })
        .map(|row| merge_fields(schema, &store.labels().pair_separator, row))
        .collect()
}
