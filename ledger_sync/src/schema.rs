//! The fixed ledger column schema.
//!
//! Column order is the file contract: 25 columns, one header row, data
//! and aggregate rows all share it. The schema is built once (with the
//! injected style directives) and passed by reference everywhere a
//! column offset or A1 letter is needed; no call site looks columns up
//! by display label.

use serde::Deserialize;

/// Internal key of one ledger column, declared in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    OrderId,
    Status,
    DatePaid,
    CustomerId,
    BillingName,
    Phone,
    Email,
    Birthday,
    RegionCity,
    Address,
    Postcode,
    Total,
    Shipping,
    Discount,
    AdjustedDiscount,
    ProductSku,
    ItemName,
    Quantity,
    ItemTotal,
    AccountingId,
    DispatchDate,
    TrackingCode,
    PostalPayment,
    CompanyPostage,
    DeliveryDate,
}

/// Every column in file order.
pub const COLUMNS: [ColumnKey; 25] = [
    ColumnKey::OrderId,
    ColumnKey::Status,
    ColumnKey::DatePaid,
    ColumnKey::CustomerId,
    ColumnKey::BillingName,
    ColumnKey::Phone,
    ColumnKey::Email,
    ColumnKey::Birthday,
    ColumnKey::RegionCity,
    ColumnKey::Address,
    ColumnKey::Postcode,
    ColumnKey::Total,
    ColumnKey::Shipping,
    ColumnKey::Discount,
    ColumnKey::AdjustedDiscount,
    ColumnKey::ProductSku,
    ColumnKey::ItemName,
    ColumnKey::Quantity,
    ColumnKey::ItemTotal,
    ColumnKey::AccountingId,
    ColumnKey::DispatchDate,
    ColumnKey::TrackingCode,
    ColumnKey::PostalPayment,
    ColumnKey::CompanyPostage,
    ColumnKey::DeliveryDate,
];

/// Columns whose bucket sums feed the subtotal and grand-total rows.
pub const AGGREGATED_COLUMNS: [ColumnKey; 7] = [
    ColumnKey::Total,
    ColumnKey::Shipping,
    ColumnKey::Discount,
    ColumnKey::AdjustedDiscount,
    ColumnKey::ItemTotal,
    ColumnKey::PostalPayment,
    ColumnKey::CompanyPostage,
];

/// How cells in a column are typed on load and save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// Integer cells; parsed on load, rendered as plain digits.
    Number,
    /// Literal text; round-trips verbatim (phones, postcodes, dates).
    Text,
}

fn default_numeric_columns() -> Vec<ColumnKey> {
    AGGREGATED_COLUMNS.to_vec()
}

fn default_literal_columns() -> Vec<ColumnKey> {
    vec![ColumnKey::DatePaid, ColumnKey::Phone, ColumnKey::Postcode]
}

/// Style directives for the output file, injected at construction time
/// rather than living in process-wide mutable state.
///
/// `numeric_columns` get integer typing (a grouped number format in a
/// richer target); `literal_columns` are forced to text so phone numbers
/// and postcodes never get reinterpreted as numbers.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    #[serde(default = "default_numeric_columns")]
    pub numeric_columns: Vec<ColumnKey>,
    #[serde(default = "default_literal_columns")]
    pub literal_columns: Vec<ColumnKey>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            numeric_columns: default_numeric_columns(),
            literal_columns: default_literal_columns(),
        }
    }
}

/// The resolved schema: column order plus per-column cell typing.
#[derive(Clone, Debug)]
pub struct Schema {
    kinds: [CellKind; COLUMNS.len()],
}

impl Schema {
    pub fn new(styles: &StyleConfig) -> Self {
        let mut kinds = [CellKind::Text; COLUMNS.len()];
        // Identity and count columns are integers regardless of styling.
        for key in [ColumnKey::OrderId, ColumnKey::CustomerId, ColumnKey::Quantity] {
            kinds[key as usize] = CellKind::Number;
        }
        for &key in &styles.numeric_columns {
            kinds[key as usize] = CellKind::Number;
        }
        for &key in &styles.literal_columns {
            kinds[key as usize] = CellKind::Text;
        }
        Self { kinds }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        COLUMNS.len()
    }

    /// Zero-based position of a column.
    pub fn position(&self, key: ColumnKey) -> usize {
        key as usize
    }

    /// A1-style column letter.
    pub fn letter(&self, key: ColumnKey) -> String {
        column_letter(key as usize)
    }

    pub fn kind(&self, key: ColumnKey) -> CellKind {
        self.kinds[key as usize]
    }

    pub fn kind_at(&self, position: usize) -> CellKind {
        self.kinds[position]
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(&StyleConfig::default())
    }
}

/// Converts a zero-based column position to its A1 letter (0 → A,
/// 25 → Z, 26 → AA).
pub fn column_letter(position: usize) -> String {
    let mut n = position + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}
