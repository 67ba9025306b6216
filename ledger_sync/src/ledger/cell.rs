//! Typed ledger cells.

use crate::schema::CellKind;

/// One cell of the ledger.
///
/// Parsing is schema-directed: number columns parse integers, any
/// `=`-prefixed field is a live formula, and everything else, including
/// manual edits in number columns, round-trips as verbatim text. A cell
/// written and re-read through the same schema renders identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Int(i64),
    Text(String),
    Formula(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    /// Parses one stored field under the column's cell kind.
    pub fn from_field(kind: CellKind, field: &str) -> Self {
        if field.is_empty() {
            return Cell::Empty;
        }
        if field.starts_with('=') {
            return Cell::Formula(field.to_string());
        }
        if kind == CellKind::Number {
            // Only canonical integer forms become Int; "007" or "+5"
            // round-trip as text so a reload never rewrites them.
            if let Ok(value) = field.parse::<i64>() {
                if value.to_string() == field {
                    return Cell::Int(value);
                }
            }
        }
        Cell::Text(field.to_string())
    }

    /// Renders the cell to its stored field form.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(value) => value.to_string(),
            Cell::Text(value) => value.clone(),
            Cell::Formula(expr) => expr.clone(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}
