//! The persistent ledger store.
//!
//! Owns every row of the file: header, data rows (with their line-item
//! child rows), month subtotal rows and the trailing grand total. Only
//! the four dispatch-tracking columns of an existing row are ever
//! rewritten; all other cells, including manual edits anywhere in the
//! sheet, round-trip untouched.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::{info, warn};

use crate::calendar::{JalaliDate, MonthKey};
use crate::error::StoreError;
use crate::ledger::aggregate::MonthAggregator;
use crate::ledger::cell::Cell;
use crate::locale::Labels;
use crate::project::ProjectedOrder;
use crate::schema::{ColumnKey, Schema};

/// Columns an upsert may rewrite on an existing row.
const MUTABLE_COLUMNS: [ColumnKey; 4] = [
    ColumnKey::Status,
    ColumnKey::DispatchDate,
    ColumnKey::TrackingCode,
    ColumnKey::DeliveryDate,
];

/// What `upsert` did with a projected order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Existing row; `fields_changed` of the four mutable cells differed.
    Updated { fields_changed: usize },
    /// New row (plus children) appended.
    Inserted,
    /// New order without a paid date: cannot be bucketed, not written.
    SkippedDateless,
}

pub struct LedgerStore {
    schema: Schema,
    labels: Labels,
    rows: Vec<Vec<Cell>>,
    index: HashMap<u64, usize>,
}

impl LedgerStore {
    /// Opens the ledger, or initializes an empty one (header only) when
    /// the file does not exist yet.
    ///
    /// The trailing subtotal and grand-total rows are stripped here
    /// (they are regenerated at the end of every batch, never patched in
    /// place) and the identifier index is rebuilt from the remaining
    /// data rows. Aggregate rows are recognized by their label cells;
    /// a file that never had them loses nothing.
    pub fn load(path: &Path, schema: Schema, labels: Labels) -> Result<Self, StoreError> {
        let mut rows = Vec::new();

        if path.exists() {
            let mut reader = ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;
            for (row_idx, record) in reader.records().enumerate() {
                let record = record?;
                if record.len() > schema.len() {
                    return Err(StoreError::RowTooWide {
                        row: row_idx + 1,
                        expected: schema.len(),
                        found: record.len(),
                    });
                }
                // Short rows (hand-trimmed files) pad with empty cells.
                let cells = (0..schema.len())
                    .map(|pos| Cell::from_field(schema.kind_at(pos), record.get(pos).unwrap_or("")))
                    .collect();
                rows.push(cells);
            }
        } else {
            warn!(path = %path.display(), "ledger file does not exist, starting a new one");
        }

        if rows.is_empty() {
            rows.push(labels.header_row().map(Cell::text).collect());
            info!("wrote header row");
        }

        let mut store = Self {
            schema,
            labels,
            rows,
            index: HashMap::new(),
        };
        store.strip_trailing_aggregates();
        store.rebuild_index();
        Ok(store)
    }

    fn label_of(&self, row: &[Cell]) -> Option<String> {
        row[self.schema.position(ColumnKey::Address)]
            .as_text()
            .map(str::to_string)
    }

    fn strip_trailing_aggregates(&mut self) {
        if self
            .rows
            .last()
            .and_then(|row| self.label_of(row))
            .is_some_and(|label| label == self.labels.grand_total)
        {
            self.rows.pop();
            info!("removed grand-total row for regeneration");
        }
        if self
            .rows
            .last()
            .and_then(|row| self.label_of(row))
            .is_some_and(|label| label == self.labels.month_subtotal)
        {
            self.rows.pop();
            info!("removed trailing month subtotal row for regeneration");
        }
    }

    fn rebuild_index(&mut self) {
        let id_pos = self.schema.position(ColumnKey::OrderId);
        self.index = self
            .rows
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(idx, row)| row[id_pos].as_int().map(|id| (id as u64, idx)))
            .collect();
    }

    /// First row index of the open (trailing) bucket: right after the
    /// last surviving subtotal row, or the first data row.
    fn trailing_bucket_start(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| {
                self.label_of(row)
                    .is_some_and(|label| label == self.labels.month_subtotal)
            })
            .map(|idx| idx + 1)
            .unwrap_or(1)
    }

    /// Month key of the open bucket, derived from the paid-date cell of
    /// its last data row. `None` when the trailing bucket has no rows.
    fn open_month(&self) -> Option<MonthKey> {
        let id_pos = self.schema.position(ColumnKey::OrderId);
        let date_pos = self.schema.position(ColumnKey::DatePaid);
        self.rows[self.trailing_bucket_start()..]
            .iter()
            .rev()
            .filter(|row| row[id_pos].as_int().is_some())
            .find_map(|row| {
                row[date_pos]
                    .as_text()
                    .and_then(|text| text.parse::<JalaliDate>().ok())
                    .map(|date| date.month_key())
            })
    }

    /// Builds the batch aggregator seeded with the loaded bucket state.
    pub fn month_aggregator(&self) -> MonthAggregator {
        MonthAggregator::new(
            self.schema.clone(),
            self.labels.month_subtotal.clone(),
            self.labels.grand_total.clone(),
            self.open_month(),
            self.trailing_bucket_start(),
        )
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Insert-if-absent, update-mutable-fields-if-present.
    pub fn upsert(
        &mut self,
        projected: &ProjectedOrder,
        aggregator: &mut MonthAggregator,
    ) -> UpsertOutcome {
        if let Some(&row_idx) = self.index.get(&projected.id) {
            return UpsertOutcome::Updated {
                fields_changed: self.update_mutable_fields(row_idx, projected),
            };
        }

        let Some(month) = projected.month else {
            warn!(
                order = projected.id,
                "record has no paid date; excluded from monthly bucketing"
            );
            return UpsertOutcome::SkippedDateless;
        };

        aggregator.on_new_order(month, &mut self.rows);

        let row_number = self.rows.len() + 1;
        let mut cells = projected.cells.clone();
        let total_letter = self.schema.letter(ColumnKey::Total);
        let payment_letter = self.schema.letter(ColumnKey::PostalPayment);
        cells[self.schema.position(ColumnKey::CompanyPostage)] =
            Cell::Formula(format!("={total_letter}{row_number}-{payment_letter}{row_number}"));

        self.index.insert(projected.id, self.rows.len());
        self.rows.push(cells);
        for child in &projected.children {
            self.rows.push(child.clone());
        }
        info!(order = projected.id, row = row_number, "appended ledger row");
        UpsertOutcome::Inserted
    }

    fn update_mutable_fields(&mut self, row_idx: usize, projected: &ProjectedOrder) -> usize {
        let mut changed = 0;
        for key in MUTABLE_COLUMNS {
            let pos = self.schema.position(key);
            let new = &projected.cells[pos];
            let old = &self.rows[row_idx][pos];
            if old != new {
                info!(
                    order = projected.id,
                    field = ?key,
                    old = %old.to_field(),
                    new = %new.to_field(),
                    "updating tracked field"
                );
                self.rows[row_idx][pos] = new.clone();
                changed += 1;
            }
        }
        changed
    }

    /// Closes the trailing bucket and regenerates the grand total.
    pub fn finish_batch(&mut self, aggregator: &mut MonthAggregator) {
        aggregator.finish(&mut self.rows);
    }

    /// Persists the ledger atomically: the full sheet is written to a
    /// temporary sibling which then replaces the original, so a crash
    /// mid-write never corrupts the previously-saved file.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let tmp = path.with_extension("tmp");
        {
            let mut writer = WriterBuilder::new().has_headers(false).from_path(&tmp)?;
            for row in &self.rows {
                writer.write_record(row.iter().map(Cell::to_field))?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp, path)?;
        info!(rows = self.rows.len(), path = %path.display(), "ledger saved");
        Ok(())
    }

    /// Every row including header and aggregates, in file order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Data rows only (rows carrying an order identifier).
    pub fn data_rows(&self) -> impl Iterator<Item = &[Cell]> {
        let id_pos = self.schema.position(ColumnKey::OrderId);
        self.rows
            .iter()
            .skip(1)
            .filter(move |row| row[id_pos].as_int().is_some())
            .map(Vec::as_slice)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }
}
