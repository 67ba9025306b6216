//! Month-bucket bookkeeping: subtotal rows and the grand total.
//!
//! The aggregator owns the two synthetic row kinds and nothing else. It
//! runs a two-state machine over newly inserted rows (`no_bucket_open` /
//! `bucket_open`, keyed by Jalali month); updates to existing rows never
//! reach it, so closed buckets are never reopened or regenerated.

use tracing::info;

use crate::calendar::MonthKey;
use crate::ledger::cell::Cell;
use crate::schema::{AGGREGATED_COLUMNS, ColumnKey, Schema};

/// Bucket state carried across one reconcile batch.
pub struct MonthAggregator {
    schema: Schema,
    month_label: String,
    grand_label: String,
    open: Option<MonthKey>,
    /// Zero-based index of the first row of the open (trailing) bucket.
    bucket_start: usize,
}

impl MonthAggregator {
    pub fn new(
        schema: Schema,
        month_label: String,
        grand_label: String,
        open: Option<MonthKey>,
        bucket_start: usize,
    ) -> Self {
        Self {
            schema,
            month_label,
            grand_label,
            open,
            bucket_start,
        }
    }

    /// Transition on a new (non-update) row. When the month key changes
    /// while a bucket is open, the previous bucket is closed with its
    /// subtotal row immediately after its last row.
    pub fn on_new_order(&mut self, month: MonthKey, rows: &mut Vec<Vec<Cell>>) {
        match self.open {
            Some(open) if open == month => {}
            Some(open) => {
                info!(bucket = %open, next = %month, "closing month bucket");
                let subtotal = self.subtotal_row(rows);
                rows.push(subtotal);
                self.bucket_start = rows.len();
                self.open = Some(month);
            }
            None => {
                self.open = Some(month);
            }
        }
    }

    /// End of batch: close the trailing bucket, then combine every
    /// subtotal row into the grand total.
    pub fn finish(&mut self, rows: &mut Vec<Vec<Cell>>) {
        if rows.len() > self.bucket_start {
            let subtotal = self.subtotal_row(rows);
            rows.push(subtotal);
            self.bucket_start = rows.len();
        }
        if let Some(grand) = self.grand_total_row(rows) {
            rows.push(grand);
        }
    }

    /// Builds the subtotal row for `bucket_start..` of the sheet: a label
    /// cell, the order count, and a `SUM` over exactly the bucket's row
    /// range per aggregated column. Row numbers are 1-based.
    fn subtotal_row(&self, rows: &[Vec<Cell>]) -> Vec<Cell> {
        let schema = &self.schema;
        let from_row = self.bucket_start + 1;
        let last_row = rows.len();

        let id_pos = schema.position(ColumnKey::OrderId);
        let order_count = rows[self.bucket_start..]
            .iter()
            .filter(|row| row[id_pos].as_int().is_some())
            .count() as i64;

        let mut cells = vec![Cell::Empty; schema.len()];
        cells[schema.position(ColumnKey::Address)] = Cell::Text(self.month_label.clone());
        cells[schema.position(ColumnKey::Postcode)] = Cell::Int(order_count);
        for key in AGGREGATED_COLUMNS {
            let letter = schema.letter(key);
            cells[schema.position(key)] =
                Cell::Formula(format!("=SUM({letter}{from_row}:{letter}{last_row})"));
        }
        cells
    }

    /// Builds the grand-total row from the already-computed subtotal
    /// sums, never by rescanning data rows, so a manual edit inside a
    /// closed bucket does not leak into the total. Returns `None` on a
    /// ledger with no buckets at all.
    fn grand_total_row(&self, rows: &[Vec<Cell>]) -> Option<Vec<Cell>> {
        let schema = &self.schema;
        let address_pos = schema.position(ColumnKey::Address);
        let subtotal_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[address_pos].as_text() == Some(self.month_label.as_str()))
            .map(|(idx, _)| idx + 1)
            .collect();
        if subtotal_rows.is_empty() {
            return None;
        }

        let combine = |letter: &str| {
            let parts: Vec<String> = subtotal_rows
                .iter()
                .map(|row| format!("{letter}{row}"))
                .collect();
            Cell::Formula(format!("={}", parts.join("+")))
        };

        let mut cells = vec![Cell::Empty; schema.len()];
        cells[address_pos] = Cell::Text(self.grand_label.clone());
        cells[schema.position(ColumnKey::Postcode)] = combine(&schema.letter(ColumnKey::Postcode));
        for key in AGGREGATED_COLUMNS {
            cells[schema.position(key)] = combine(&schema.letter(key));
        }
        Some(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(year: i32, month: u32) -> MonthKey {
        MonthKey { year, month }
    }

    fn aggregator(open: Option<MonthKey>, bucket_start: usize) -> MonthAggregator {
        MonthAggregator::new(
            Schema::default(),
            "Monthly Orders".into(),
            "All Orders".into(),
            open,
            bucket_start,
        )
    }

    fn data_row(schema: &Schema, id: i64, total: i64) -> Vec<Cell> {
        let mut cells = vec![Cell::Empty; schema.len()];
        cells[schema.position(ColumnKey::OrderId)] = Cell::Int(id);
        cells[schema.position(ColumnKey::Total)] = Cell::Int(total);
        cells
    }

    fn header(schema: &Schema) -> Vec<Cell> {
        vec![Cell::Empty; schema.len()]
    }

    fn label_at(schema: &Schema, row: &[Cell]) -> Option<String> {
        row[schema.position(ColumnKey::Address)]
            .as_text()
            .map(str::to_string)
    }

    #[test]
    fn same_month_appends_without_subtotal() {
        let schema = Schema::default();
        let mut rows = vec![header(&schema)];
        let mut agg = aggregator(None, 1);

        agg.on_new_order(key(1404, 4), &mut rows);
        rows.push(data_row(&schema, 1, 100));
        agg.on_new_order(key(1404, 4), &mut rows);
        rows.push(data_row(&schema, 2, 200));

        assert_eq!(rows.len(), 3, "no subtotal inserted mid-bucket");
    }

    #[test]
    fn month_change_closes_previous_bucket() {
        let schema = Schema::default();
        let mut rows = vec![header(&schema)];
        let mut agg = aggregator(None, 1);

        agg.on_new_order(key(1404, 4), &mut rows);
        rows.push(data_row(&schema, 1, 100)); // row 2
        agg.on_new_order(key(1404, 5), &mut rows); // closes Tir
        rows.push(data_row(&schema, 2, 200)); // row 4
        agg.finish(&mut rows);

        // header, order, subtotal, order, subtotal, grand total
        assert_eq!(rows.len(), 6);
        assert_eq!(label_at(&schema, &rows[2]).as_deref(), Some("Monthly Orders"));
        assert_eq!(label_at(&schema, &rows[4]).as_deref(), Some("Monthly Orders"));
        assert_eq!(label_at(&schema, &rows[5]).as_deref(), Some("All Orders"));

        // first bucket sums rows 2..2 only
        let total_pos = schema.position(ColumnKey::Total);
        assert_eq!(rows[2][total_pos], Cell::Formula("=SUM(L2:L2)".into()));
        // second bucket starts after the subtotal, never overlapping
        assert_eq!(rows[4][total_pos], Cell::Formula("=SUM(L4:L4)".into()));
    }

    #[test]
    fn subtotal_counts_orders_not_children() {
        let schema = Schema::default();
        let mut rows = vec![header(&schema)];
        let mut agg = aggregator(None, 1);

        agg.on_new_order(key(1404, 4), &mut rows);
        rows.push(data_row(&schema, 1, 100));
        rows.push(header(&schema)); // child row: no order id
        rows.push(header(&schema));
        agg.finish(&mut rows);

        let subtotal = &rows[4];
        assert_eq!(subtotal[schema.position(ColumnKey::Postcode)], Cell::Int(1));
    }

    #[test]
    fn grand_total_combines_subtotal_rows_only() {
        let schema = Schema::default();
        let mut rows = vec![header(&schema)];
        let mut agg = aggregator(None, 1);

        agg.on_new_order(key(1404, 3), &mut rows);
        rows.push(data_row(&schema, 1, 100));
        agg.on_new_order(key(1404, 4), &mut rows);
        rows.push(data_row(&schema, 2, 200));
        agg.finish(&mut rows);

        let grand = rows.last().unwrap();
        let total_pos = schema.position(ColumnKey::Total);
        // subtotals landed on rows 3 and 5
        assert_eq!(grand[total_pos], Cell::Formula("=L3+L5".into()));
        assert_eq!(
            grand[schema.position(ColumnKey::Postcode)],
            Cell::Formula("=K3+K5".into())
        );
    }

    #[test]
    fn finish_on_empty_ledger_adds_nothing() {
        let schema = Schema::default();
        let mut rows = vec![header(&schema)];
        let mut agg = aggregator(None, 1);
        agg.finish(&mut rows);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn preexisting_open_bucket_key_defers_to_loaded_state() {
        // Store loads with Tir open (rows 2..3 are Tir data); an insert
        // in Mordad must close Tir even though this run saw no Tir
        // insert.
        let schema = Schema::default();
        let mut rows = vec![header(&schema), data_row(&schema, 1, 100)];
        let mut agg = aggregator(Some(key(1404, 4)), 1);

        agg.on_new_order(key(1404, 5), &mut rows);
        rows.push(data_row(&schema, 2, 200));
        agg.finish(&mut rows);

        assert_eq!(label_at(&schema, &rows[2]).as_deref(), Some("Monthly Orders"));
        let total_pos = schema.position(ColumnKey::Total);
        assert_eq!(rows[2][total_pos], Cell::Formula("=SUM(L2:L2)".into()));
    }
}
