//! Row-oriented in-memory table of JSON records.

use serde_json::{Map, Value};
use std::collections::HashSet;

pub type Row = Map<String, Value>;

/// Columns are the union of row keys in first-appearance order.
/// Add columns through `push` or `add_column` so the lookup set stays in sync.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    known: HashSet<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut t = Self::new();
        for row in rows {
            t.push(row);
        }
        t
    }

    pub fn push(&mut self, row: Row) {
        for key in row.keys() {
            if !self.known.contains(key) {
                self.add_column(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Register a column name; no-op when it is already known.
    pub fn add_column(&mut self, name: String) {
        if self.known.insert(name.clone()) {
            self.columns.push(name);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    /// Append all rows of `other` after ours. No deduplication.
    pub fn extend(&mut self, other: Table) {
        for row in other.rows {
            self.push(row);
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// Keep only `cols`, in that order. Missing cells become `null`.
    pub fn select(&self, cols: &[String]) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                cols.iter()
                    .map(|c| (c.clone(), r.get(c).cloned().unwrap_or(Value::Null)))
                    .collect::<Row>()
            })
            .collect();
        let cols = Self::dedup_columns(cols.to_vec());
        Table { known: cols.iter().cloned().collect(), columns: cols, rows }
    }

    /// Drop duplicate column names while keeping order.
    pub fn dedup_columns(cols: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        cols.into_iter().filter(|c| seen.insert(c.clone())).collect()
    }
}

/// String view of a cell: strings as-is, scalars rendered, null/missing as None.
pub fn cell_str(row: &Row, col: &str) -> Option<String> {
    match row.get(col)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
