//! Ledger-side of the order sync pipeline.
//!
//! Takes the unordered batch fetched by `order_ingestor` and reconciles
//! it into a persistent, human-editable tabular ledger: one row per
//! order (plus line-item child rows), one subtotal row per Jalali month
//! bucket, and a single trailing grand-total row combining the subtotal
//! sums.

pub mod calendar;
pub mod config;
pub mod digits;
pub mod error;
pub mod ledger;
pub mod locale;
pub mod mailmerge;
pub mod project;
pub mod schema;
pub mod sync;
