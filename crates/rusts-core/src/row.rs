//! Query result rows
//!
//! The query transport hands back one `Row` per result record: a map from
//! column name to a cell tagged with the column's role. Tag and field cells
//! map straight onto a point; the reserved `time` column carries the
//! timestamp as an arbitrary-width nanosecond integer.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::types::FieldValue;

/// Reserved column holding the row timestamp in nanoseconds
pub const TIME_COLUMN: &str = "time";

/// Reserved column holding the source measurement of a row
pub const MEASUREMENT_COLUMN: &str = "iox::measurement";

/// A single cell of a query result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Tag column value
    Tag(String),
    /// Field column value
    Field(FieldValue),
    /// Timestamp column value, nanoseconds since the Unix epoch
    Time(i128),
}

/// Generic query result row keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    columns: BTreeMap<String, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell, returning the cell previously stored under `column`
    pub fn insert(&mut self, column: impl Into<String>, cell: Cell) -> Option<Cell> {
        self.columns.insert(column.into(), cell)
    }

    pub fn with_tag(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, Cell::Tag(value.into()));
        self
    }

    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(column, Cell::Field(value.into()));
        self
    }

    pub fn with_time(mut self, nanos: i128) -> Self {
        self.insert(TIME_COLUMN, Cell::Time(nanos));
        self
    }

    pub fn with_measurement(self, measurement: impl Into<String>) -> Self {
        self.with_tag(MEASUREMENT_COLUMN, measurement)
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns.get(column)
    }

    /// Timestamp from the reserved `time` column, if present
    pub fn time(&self) -> Option<i128> {
        match self.columns.get(TIME_COLUMN) {
            Some(Cell::Time(nanos)) => Some(*nanos),
            _ => None,
        }
    }

    /// Measurement from the reserved measurement column, if present
    pub fn measurement(&self) -> Option<&str> {
        match self.columns.get(MEASUREMENT_COLUMN) {
            Some(Cell::Tag(name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Cell> {
        self.columns.iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Cell);
    type IntoIter = btree_map::Iter<'a, String, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

impl FromIterator<(String, Cell)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_columns() {
        let row = Row::new()
            .with_measurement("cpu")
            .with_tag("host", "a")
            .with_field("usage", 0.5)
            .with_time(1_700_000_000_000_000_000);

        assert_eq!(row.measurement(), Some("cpu"));
        assert_eq!(row.time(), Some(1_700_000_000_000_000_000));
        assert_eq!(row.len(), 4);
        assert_eq!(row.get("host"), Some(&Cell::Tag("a".to_string())));
    }

    #[test]
    fn test_time_column_of_wrong_kind_is_ignored() {
        let row = Row::new().with_field(TIME_COLUMN, 12_i64);
        assert_eq!(row.time(), None);
        assert_eq!(Row::new().with_measurement("").measurement(), None);
    }
}
