//! Ingestion client for the remote order-management API.
//!
//! This crate owns the remote side of the sync pipeline: the upstream
//! record model, the transport seam, the retrying page fetcher and the
//! concurrent paginator. It knows nothing about the ledger file; it hands
//! back a flat, unordered batch of [`models::order::RemoteOrderRecord`]s.

pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
