//! End-to-end reconcile cycle against a real ledger file.

use std::path::Path;

use order_ingestor::models::order::RemoteOrderRecord;

use ledger_sync::ledger::LedgerStore;
use ledger_sync::locale::{Labels, Lang};
use ledger_sync::project::ProjectionContext;
use ledger_sync::schema::{ColumnKey, Schema};
use ledger_sync::sync::{SyncReport, reconcile_orders};

const SUBTOTAL_LABEL: &str = "Monthly Orders";
const GRAND_LABEL: &str = "All Orders";

fn order(
    id: u64,
    date_paid: Option<&str>,
    status: &str,
    total: &str,
    meta: &[(&str, &str)],
    items: &[(&str, i64, &str)],
) -> RemoteOrderRecord {
    let meta_data: Vec<_> = meta
        .iter()
        .map(|(key, value)| serde_json::json!({"key": key, "value": value}))
        .collect();
    let line_items: Vec<_> = items
        .iter()
        .map(|(sku, quantity, item_total)| {
            serde_json::json!({
                "sku": sku,
                "name": format!("Item {sku}"),
                "quantity": quantity,
                "total": item_total,
            })
        })
        .collect();
    serde_json::from_value(serde_json::json!({
        "id": id,
        "status": status,
        "date_paid": date_paid,
        "customer_id": 9,
        "billing": {
            "first_name": "Neda",
            "last_name": "Karimi",
            "phone": "9123456789",
            "email": "neda@example.com"
        },
        "shipping": {
            "state": "XYZ",
            "city": "XYZ",
            "address_1": "Valiasr 10",
            "postcode": "1234567890"
        },
        "total": total,
        "discount_total": "0",
        "shipping_lines": [{"total": "50"}],
        "meta_data": meta_data,
        "line_items": line_items,
    }))
    .unwrap()
}

fn run(path: &Path, orders: &[RemoteOrderRecord]) -> SyncReport {
    let schema = Schema::default();
    let labels = Labels::for_lang(Lang::En);
    let mut store = LedgerStore::load(path, schema.clone(), labels.clone()).expect("load");
    let ctx = ProjectionContext {
        schema: &schema,
        labels: &labels,
    };
    let report = reconcile_orders(&mut store, orders, &ctx);
    store.save(path).expect("save");
    report
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .expect("open ledger");
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

fn write_rows(path: &Path, rows: &[Vec<String>]) {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("rewrite ledger");
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

fn col(key: ColumnKey) -> usize {
    key as usize
}

/// Three orders: two in Tir 1404 (one with a line item), one in Mordad.
fn standard_batch() -> Vec<RemoteOrderRecord> {
    vec![
        order(1, Some("2025-07-10T08:00:00"), "processing", "1000", &[], &[]),
        order(
            2,
            Some("2025-07-15T08:00:00"),
            "processing",
            "2000",
            &[],
            &[("SKU-9", 1, "2000")],
        ),
        order(3, Some("2025-07-25T08:00:00"), "completed", "3000", &[], &[]),
    ]
}

#[test]
fn first_run_lays_out_buckets_and_totals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    let report = run(&path, &standard_batch());
    assert_eq!(report.new_orders, 3);
    assert_eq!(report.updated_orders, 0);

    let rows = read_rows(&path);
    // header, id1, id2, child, Tir subtotal, id3, Mordad subtotal, grand
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[1][col(ColumnKey::OrderId)], "1");
    assert_eq!(rows[2][col(ColumnKey::OrderId)], "2");
    assert_eq!(rows[3][col(ColumnKey::ProductSku)], "SKU-9");
    assert_eq!(rows[4][col(ColumnKey::Address)], SUBTOTAL_LABEL);
    assert_eq!(rows[5][col(ColumnKey::OrderId)], "3");
    assert_eq!(rows[6][col(ColumnKey::Address)], SUBTOTAL_LABEL);
    assert_eq!(rows[7][col(ColumnKey::Address)], GRAND_LABEL);

    // bucket ranges never overlap: Tir sums rows 2..4, Mordad row 6 only
    assert_eq!(rows[4][col(ColumnKey::Total)], "=SUM(L2:L4)");
    assert_eq!(rows[6][col(ColumnKey::Total)], "=SUM(L6:L6)");
    // counts are orders, not child rows
    assert_eq!(rows[4][col(ColumnKey::Postcode)], "2");
    assert_eq!(rows[6][col(ColumnKey::Postcode)], "1");

    // grand total combines the subtotal rows, not the data rows
    assert_eq!(rows[7][col(ColumnKey::Total)], "=L5+L7");
    assert_eq!(rows[7][col(ColumnKey::Postcode)], "=K5+K7");

    // the live company-postage formula references this row's own cells
    assert_eq!(rows[1][col(ColumnKey::CompanyPostage)], "=L2-W2");

    // monetary scaling on the way in
    assert_eq!(rows[1][col(ColumnKey::Total)], "10000");
    assert_eq!(rows[3][col(ColumnKey::ItemTotal)], "20000");
}

#[test]
fn reconcile_is_idempotent_cell_for_cell() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    let batch = standard_batch();

    run(&path, &batch);
    let first = std::fs::read_to_string(&path).unwrap();

    let report = run(&path, &batch);
    assert_eq!(report.new_orders, 0);
    assert_eq!(report.updated_orders, 0);
    let second = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first, second, "second run must be byte-identical");

    // an empty batch regenerates the same trailing aggregates too
    run(&path, &[]);
    let third = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first, third);
}

#[test]
fn upsert_touches_only_the_four_tracked_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    run(&path, &standard_batch());
    let before = read_rows(&path);

    // same order, new status and dispatch metadata
    let changed = vec![order(
        1,
        Some("2025-07-10T08:00:00"),
        "deliver",
        "1000",
        &[
            ("datei", "1404/05/01"),
            ("marsule", "RX1234567"),
            ("datedeliver", "1404/05/05"),
        ],
        &[],
    )];
    let report = run(&path, &changed);
    assert_eq!(report.new_orders, 0);
    assert_eq!(report.updated_orders, 1);

    let after = read_rows(&path);
    assert_eq!(before.len(), after.len());

    let tracked = [
        col(ColumnKey::Status),
        col(ColumnKey::DispatchDate),
        col(ColumnKey::TrackingCode),
        col(ColumnKey::DeliveryDate),
    ];
    for (row_idx, (old_row, new_row)) in before.iter().zip(&after).enumerate() {
        for (pos, (old, new)) in old_row.iter().zip(new_row).enumerate() {
            if row_idx == 1 && tracked.contains(&pos) {
                continue;
            }
            assert_eq!(old, new, "row {row_idx} col {pos} must not change");
        }
    }
    assert_eq!(after[1][col(ColumnKey::Status)], "Deliver");
    assert_eq!(after[1][col(ColumnKey::TrackingCode)], "RX1234567");
}

#[test]
fn manual_edits_outside_managed_columns_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    run(&path, &standard_batch());

    let mut rows = read_rows(&path);
    rows[1][col(ColumnKey::AccountingId)] = "ACC-007".to_string();
    rows[2][col(ColumnKey::PostalPayment)] = "1250".to_string();
    write_rows(&path, &rows);

    run(&path, &standard_batch());

    let after = read_rows(&path);
    assert_eq!(after[1][col(ColumnKey::AccountingId)], "ACC-007");
    assert_eq!(after[2][col(ColumnKey::PostalPayment)], "1250");
}

#[test]
fn closed_buckets_are_never_rescanned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    run(&path, &standard_batch());
    let before = read_rows(&path);

    // simulate a manual edit to a data cell inside the closed Tir bucket
    let mut rows = before.clone();
    rows[1][col(ColumnKey::Total)] = "99999".to_string();
    write_rows(&path, &rows);

    run(&path, &standard_batch());
    let after = read_rows(&path);

    // the edit survives, and neither the closed bucket's subtotal row nor
    // the grand total row was rebuilt from data rows
    assert_eq!(after[1][col(ColumnKey::Total)], "99999");
    assert_eq!(after[4], before[4], "closed subtotal row untouched");
    assert_eq!(after[7], before[7], "grand total still combines subtotals");
    assert_eq!(after[7][col(ColumnKey::Total)], "=L5+L7");
}

#[test]
fn new_month_insert_closes_the_trailing_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    // first run: Tir only
    run(
        &path,
        &[order(1, Some("2025-07-10T08:00:00"), "processing", "1000", &[], &[])],
    );

    // second run re-sends Tir (update, no changes) plus a Shahrivar order
    let report = run(
        &path,
        &[
            order(1, Some("2025-07-10T08:00:00"), "processing", "1000", &[], &[]),
            order(9, Some("2025-08-25T08:00:00"), "processing", "500", &[], &[]),
        ],
    );
    assert_eq!(report.new_orders, 1);

    let rows = read_rows(&path);
    // header, id1, Tir subtotal, id9, Shahrivar subtotal, grand
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[2][col(ColumnKey::Address)], SUBTOTAL_LABEL);
    assert_eq!(rows[2][col(ColumnKey::Total)], "=SUM(L2:L2)");
    assert_eq!(rows[3][col(ColumnKey::OrderId)], "9");
    assert_eq!(rows[4][col(ColumnKey::Total)], "=SUM(L4:L4)");
    assert_eq!(rows[5][col(ColumnKey::Total)], "=L3+L5");
}

#[test]
fn dateless_records_are_skipped_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    let report = run(
        &path,
        &[
            order(1, Some("2025-07-10T08:00:00"), "processing", "1000", &[], &[]),
            order(2, None, "processing", "700", &[], &[]),
        ],
    );
    assert_eq!(report.new_orders, 1);
    assert_eq!(report.dateless, 1);

    let rows = read_rows(&path);
    assert!(
        rows.iter().all(|row| row[col(ColumnKey::OrderId)] != "2"),
        "dateless record must not be written"
    );
}

#[test]
fn unprojectable_records_skip_without_aborting_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    let mut bad = order(5, Some("2025-07-12T08:00:00"), "processing", "", &[], &[]);
    bad.total = "not-a-number".into();

    let report = run(
        &path,
        &[
            bad,
            order(6, Some("2025-07-13T08:00:00"), "processing", "400", &[], &[]),
        ],
    );
    assert_eq!(report.skipped, 1);
    assert_eq!(report.new_orders, 1);

    let rows = read_rows(&path);
    assert!(rows.iter().any(|row| row[col(ColumnKey::OrderId)] == "6"));
}

#[test]
fn duplicate_identifiers_across_pages_collapse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    let twice = vec![
        order(1, Some("2025-07-10T08:00:00"), "processing", "1000", &[], &[]),
        order(1, Some("2025-07-10T08:00:00"), "processing", "1000", &[], &[]),
    ];
    let report = run(&path, &twice);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.new_orders, 1);

    let rows = read_rows(&path);
    let id_rows = rows
        .iter()
        .filter(|row| row[col(ColumnKey::OrderId)] == "1")
        .count();
    assert_eq!(id_rows, 1);
}
