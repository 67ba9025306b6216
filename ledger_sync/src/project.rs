//! Record projection: one upstream order → one ledger row shape.
//!
//! Pure data mapping, no I/O. Field extraction, monetary scaling, the
//! tax-exclusive discount back-calculation, calendar conversion, digit
//! transliteration and phone/postcode cleanup all happen here; the store
//! decides afterwards whether the result updates an existing row or
//! becomes a new one.

use thiserror::Error;

use order_ingestor::models::order::{
    LineItem, META_BIRTHDAY, META_DELIVERY_DATE, META_DISPATCH_DATE, META_TRACKING_CODE,
    RemoteOrderRecord,
};

use crate::calendar::{self, MonthKey};
use crate::digits::to_latin_digits;
use crate::ledger::Cell;
use crate::locale::Labels;
use crate::schema::{ColumnKey, Schema};

/// Upstream minor units × this = ledger display units.
pub const MINOR_UNIT_SCALE: i64 = 10;

/// Tax-inclusive factor used to back-calculate the tax-exclusive
/// discount.
pub const TAX_INCLUSIVE_FACTOR: f64 = 1.10;

/// A record that cannot be projected; the caller skips and logs it.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// A monetary field is missing or unparseable; it is never silently
    /// treated as zero.
    #[error("order {order}: field {field} is not a monetary amount: {value:?}")]
    BadAmount {
        order: u64,
        field: &'static str,
        value: String,
    },

    /// The paid timestamp exists but cannot be parsed/converted.
    #[error("order {order}: bad paid timestamp")]
    BadPaidDate {
        order: u64,
        #[source]
        source: calendar::CalendarError,
    },
}

/// Borrowed lookup context for projection.
pub struct ProjectionContext<'a> {
    pub schema: &'a Schema,
    pub labels: &'a Labels,
}

/// The projected shape of one order: the parent row cells, the
/// line-item child rows that sit directly beneath it, and the month
/// bucket its paid date falls in (`None` for dateless records, which
/// cannot be bucketed).
#[derive(Clone, Debug)]
pub struct ProjectedOrder {
    pub id: u64,
    pub month: Option<MonthKey>,
    pub cells: Vec<Cell>,
    pub children: Vec<Vec<Cell>>,
}

/// Projects one upstream record into its ledger row shape.
pub fn project_order(
    order: &RemoteOrderRecord,
    ctx: &ProjectionContext<'_>,
) -> Result<ProjectedOrder, ProjectError> {
    let schema = ctx.schema;

    let (date_cell, month) = match order.date_paid.as_deref() {
        Some(iso) => {
            let paid = calendar::paid_date(iso).map_err(|source| ProjectError::BadPaidDate {
                order: order.id,
                source,
            })?;
            (Cell::Text(paid.to_string()), Some(paid.month_key()))
        }
        None => (Cell::Empty, None),
    };

    let total = parse_amount(order.id, "total", &order.total)? * MINOR_UNIT_SCALE;
    let discount = parse_amount(order.id, "discount_total", &order.discount_total)? * MINOR_UNIT_SCALE;
    // Half-away-from-zero; exact ties cannot occur for integer inputs.
    let adjusted_discount = (discount as f64 / TAX_INCLUSIVE_FACTOR).round() as i64;
    let shipping = shipping_total(&order.shipping_lines) * MINOR_UNIT_SCALE;

    let mut cells = vec![Cell::Empty; schema.len()];
    let mut set = |key: ColumnKey, cell: Cell| cells[schema.position(key)] = cell;

    set(ColumnKey::OrderId, Cell::Int(order.id as i64));
    set(ColumnKey::Status, Cell::text(ctx.labels.status_label(&order.status)));
    set(ColumnKey::DatePaid, date_cell);
    set(ColumnKey::CustomerId, Cell::Int(order.customer_id as i64));
    set(
        ColumnKey::BillingName,
        Cell::text(format!("{} {}", order.billing.first_name, order.billing.last_name)),
    );
    set(ColumnKey::Phone, Cell::text(normalize_phone(&order.billing.phone)));
    set(ColumnKey::Email, Cell::text(order.billing.email.clone()));
    set(
        ColumnKey::Birthday,
        Cell::text(to_latin_digits(
            order.meta_text(META_BIRTHDAY).unwrap_or_default().trim(),
        )),
    );
    set(
        ColumnKey::RegionCity,
        Cell::text(region_city(
            ctx.labels.region_name(&order.shipping.state),
            &order.shipping.city,
            &ctx.labels.pair_separator,
        )),
    );
    set(
        ColumnKey::Address,
        Cell::text(to_latin_digits(&order.shipping.address_1)),
    );
    set(
        ColumnKey::Postcode,
        Cell::text(normalize_postcode(&order.shipping.postcode)),
    );
    set(ColumnKey::Total, Cell::Int(total));
    set(ColumnKey::Shipping, Cell::Int(shipping));
    set(ColumnKey::Discount, Cell::Int(discount));
    set(ColumnKey::AdjustedDiscount, Cell::Int(adjusted_discount));
    set(
        ColumnKey::DispatchDate,
        Cell::text(order.meta_text(META_DISPATCH_DATE).unwrap_or_default()),
    );
    set(
        ColumnKey::TrackingCode,
        Cell::text(order.meta_text(META_TRACKING_CODE).unwrap_or_default()),
    );
    set(
        ColumnKey::DeliveryDate,
        Cell::text(order.meta_text(META_DELIVERY_DATE).unwrap_or_default()),
    );
    // AccountingId, PostalPayment: manual columns, left empty here.
    // CompanyPostage: the store installs the live formula at insert time,
    // once the row number is known.

    let children = order
        .line_items
        .iter()
        .map(|item| line_item_row(schema, item))
        .collect();

    Ok(ProjectedOrder {
        id: order.id,
        month,
        cells,
        children,
    })
}

fn line_item_row(schema: &Schema, item: &LineItem) -> Vec<Cell> {
    let mut cells = vec![Cell::Empty; schema.len()];
    cells[schema.position(ColumnKey::ProductSku)] = Cell::text(item.sku.clone());
    cells[schema.position(ColumnKey::ItemName)] = Cell::text(item.name.clone());
    cells[schema.position(ColumnKey::Quantity)] = Cell::Int(item.quantity);
    // Unparseable line totals stay empty rather than becoming zero.
    if let Some(total) = parse_amount_opt(&item.total) {
        cells[schema.position(ColumnKey::ItemTotal)] = Cell::Int(total * MINOR_UNIT_SCALE);
    }
    cells
}

/// Joins the mapped region label with the raw city, collapsing the pair
/// when they are textually identical after trimming (avoids
/// "Tehran، Tehran" artifacts).
fn region_city(region: &str, city: &str, separator: &str) -> String {
    let region = region.trim();
    let city = city.trim();
    if region == city || city.is_empty() {
        region.to_string()
    } else {
        format!("{region}{separator}{city}")
    }
}

/// Drops the `".0"` tail left behind by numeric-typed intermediates.
fn strip_decimal_artifact(value: &str) -> &str {
    value.strip_suffix(".0").unwrap_or(value)
}

fn normalize_phone(raw: &str) -> String {
    let phone = to_latin_digits(raw.trim());
    let phone = strip_decimal_artifact(&phone);
    // Local dialing prefix: a bare 10-digit mobile starting with 9 gets
    // its leading 0 back.
    if phone.len() == 10 && phone.starts_with('9') && phone.bytes().all(|b| b.is_ascii_digit()) {
        format!("0{phone}")
    } else {
        phone.to_string()
    }
}

fn normalize_postcode(raw: &str) -> String {
    strip_decimal_artifact(to_latin_digits(raw.trim()).as_str()).to_string()
}

fn parse_amount_opt(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(int);
    }
    trimmed.parse::<f64>().ok().map(|float| float.trunc() as i64)
}

fn parse_amount(order: u64, field: &'static str, value: &str) -> Result<i64, ProjectError> {
    parse_amount_opt(value).ok_or_else(|| ProjectError::BadAmount {
        order,
        field,
        value: value.to_string(),
    })
}

fn shipping_total(lines: &[order_ingestor::models::order::ShippingLine]) -> i64 {
    lines
        .iter()
        .filter_map(|line| line.total.trim().parse::<f64>().ok())
        .sum::<f64>()
        .trunc() as i64
}
