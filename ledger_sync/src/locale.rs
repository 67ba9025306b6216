//! Injected localization tables.
//!
//! The core never hard-codes display strings: status labels, column
//! headers, aggregate-row labels, region names and the region/city join
//! separator all come from a [`Labels`] value chosen by the configured
//! language and passed in at construction. The tables are consumed
//! opaquely: an unknown status key simply passes through.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::schema::{COLUMNS, ColumnKey};

/// Output language of the ledger file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Fa,
}

/// Region-code → display-name map (the 31 provinces).
const REGIONS: [(&str, &str); 31] = [
    ("EAZ", "آذربایجان شرقی"),
    ("WAZ", "آذربایجان غربی"),
    ("ADL", "اردبیل"),
    ("ESF", "اصفهان"),
    ("ABZ", "البرز"),
    ("ILM", "ایلام"),
    ("BHR", "بوشهر"),
    ("THR", "تهران"),
    ("CHB", "چهارمحال و بختیاری"),
    ("SKH", "خراسان جنوبی"),
    ("RKH", "خراسان رضوی"),
    ("NKH", "خراسان شمالی"),
    ("KHZ", "خوزستان"),
    ("ZJN", "زنجان"),
    ("SMN", "سمنان"),
    ("SBN", "سیستان و بلوچستان"),
    ("FRS", "فارس"),
    ("GZN", "قزوین"),
    ("QHM", "قم"),
    ("KRD", "کردستان"),
    ("KRN", "کرمان"),
    ("KRH", "کرمانشاه"),
    ("KBD", "کهگیلویه و بویراحمد"),
    ("GLS", "گلستان"),
    ("GIL", "گیلان"),
    ("LRS", "لرستان"),
    ("MZN", "مازندران"),
    ("MKZ", "مرکزی"),
    ("HRZ", "هرمزگان"),
    ("HDN", "همدان"),
    ("YZD", "یزد"),
];

const STATUS_EN: [(&str, &str); 9] = [
    ("pending", "Pending"),
    ("processing", "Processing"),
    ("on-hold", "On-Hold"),
    ("box", "Boxing"),
    ("completed", "Completed"),
    ("cancelled", "Cancelled"),
    ("refunded", "Refunded"),
    ("failed", "Failed"),
    ("deliver", "Deliver"),
];

const STATUS_FA: [(&str, &str); 9] = [
    ("pending", "در حال انتظار"),
    ("processing", "در حال پردازش"),
    ("on-hold", "در انتظار"),
    ("box", "در حال بسته‌بندی"),
    ("completed", "تکمیل شده"),
    ("cancelled", "لغو شده"),
    ("refunded", "بازپرداخت شده"),
    ("failed", "ناموفق"),
    ("deliver", "ارسال شده"),
];

/// Column headers in schema order.
const HEADERS_EN: [&str; 25] = [
    "Order ID",
    "Status",
    "Date Paid",
    "Customer ID",
    "Billing Name",
    "Phone",
    "Email",
    "Birthday",
    "State/City",
    "Address",
    "Postcode",
    "Total",
    "Shipping",
    "Discount",
    "Adjusted Discount",
    "Product SKU",
    "Item Name",
    "Quantity",
    "Item Total",
    "Accounting ID",
    "Dispatch Date",
    "Tracking Code",
    "Company Postal Payment",
    "Company Postage",
    "Delivery Date",
];

const HEADERS_FA: [&str; 25] = [
    "سفارش",
    "وضعيت",
    "تاريخ پرداخت",
    "کد مشتری",
    "نام و نام خانوادگی",
    "تلفن",
    "ايميل",
    "تولد",
    "استان، شهر",
    "آدرس",
    "کد پستی",
    "کل پرداخت",
    "پست",
    "تخفيف",
    "تخفيف در سپيدار",
    "SKU",
    "نام محصول",
    "تعداد",
    "مبلغ",
    "کد سپيدار",
    "تاریخ ارسال",
    "کد رهگیری",
    "پرداختی شرکت بابت پست",
    "هزینه پست شرکت",
    "تاریخ تحویل",
];

/// Display-string tables for one language.
#[derive(Clone, Debug)]
pub struct Labels {
    status: IndexMap<String, String>,
    headers: [&'static str; 25],
    regions: IndexMap<String, String>,
    /// Label cell marking a month subtotal row.
    pub month_subtotal: String,
    /// Label cell marking the grand-total row.
    pub grand_total: String,
    /// Separator joining region and city (and region/city with address).
    pub pair_separator: String,
}

impl Labels {
    pub fn for_lang(lang: Lang) -> Self {
        let (status, headers, month_subtotal, grand_total, pair_separator) = match lang {
            Lang::En => (&STATUS_EN, &HEADERS_EN, "Monthly Orders", "All Orders", ", "),
            Lang::Fa => (&STATUS_FA, &HEADERS_FA, "سفارشات ماه", "کل سفارشات", "، "),
        };
        Self {
            status: status
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: *headers,
            regions: REGIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            month_subtotal: month_subtotal.to_string(),
            grand_total: grand_total.to_string(),
            pair_separator: pair_separator.to_string(),
        }
    }

    /// Display header for a column.
    pub fn header(&self, key: ColumnKey) -> &str {
        self.headers[key as usize]
    }

    /// All headers in schema order.
    pub fn header_row(&self) -> impl Iterator<Item = &str> {
        COLUMNS.iter().map(|key| self.header(*key))
    }

    /// Maps a raw upstream status to its display label; unknown statuses
    /// pass through unchanged.
    pub fn status_label(&self, raw: &str) -> String {
        self.status
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    /// Display name for a region code; unknown codes pass through.
    pub fn region_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.regions.get(code).map(String::as_str).unwrap_or(code)
    }
}
