//! Metadata row cursors
//!
//! A driver hands back rows through [`RowSource`]. [`MetadataRowCursor`]
//! wraps a source with typed getters that fall back to defaults, tracks
//! which columns were read, and guarantees the source is released once.

use crate::catalog::Value;
use crate::error::Result;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{trace, warn};

/// A forward-only sequence of metadata rows
pub trait RowSource {
    /// Column labels, in row order
    fn columns(&self) -> &[String];

    /// Advance to the next row, `None` once exhausted
    fn next_row(&mut self) -> Result<Option<Vec<Value>>>;

    /// Release the underlying resources
    fn close(&mut self) -> Result<()>;
}

/// Cursor over a [`RowSource`] with default-supplying getters
pub struct MetadataRowCursor<'a> {
    source: Box<dyn RowSource + 'a>,
    /// Upper-cased column label to index
    column_index: IndexMap<String, usize>,
    current: Option<Vec<Value>>,
    read_columns: HashSet<usize>,
    closed: bool,
}

impl<'a> MetadataRowCursor<'a> {
    /// Wrap a row source
    pub fn new(source: Box<dyn RowSource + 'a>) -> Self {
        let column_index = source
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_ascii_uppercase(), i))
            .collect();
        Self {
            source,
            column_index,
            current: None,
            read_columns: HashSet::new(),
            closed: false,
        }
    }

    /// Advance to the next row. Returns false once the rows are exhausted.
    pub fn next(&mut self) -> Result<bool> {
        self.read_columns.clear();
        if self.closed {
            self.current = None;
            return Ok(false);
        }
        self.current = self.source.next_row()?;
        Ok(self.current.is_some())
    }

    fn cell(&mut self, column: &str) -> Option<&Value> {
        let index = *self.column_index.get(&column.to_ascii_uppercase())?;
        self.read_columns.insert(index);
        self.current.as_ref()?.get(index)
    }

    /// Get a column as a string
    pub fn get_string(&mut self, column: &str) -> Option<String> {
        self.cell(column).and_then(Value::to_string_value)
    }

    /// Get a column of the current row by position, as a string
    pub fn get_string_at(&mut self, index: usize) -> Option<String> {
        self.read_columns.insert(index);
        self.current
            .as_ref()
            .and_then(|row| row.get(index))
            .and_then(Value::to_string_value)
    }

    /// Get a column as an integer, or `default` when NULL, absent, or not
    /// numeric
    pub fn get_int(&mut self, column: &str, default: i32) -> i32 {
        self.get_optional_int(column).unwrap_or_else(|| {
            trace!(column, default, "Using default for integer column");
            default
        })
    }

    /// Get a column as an integer, `None` when NULL, absent, or not numeric
    pub fn get_optional_int(&mut self, column: &str) -> Option<i32> {
        self.cell(column)
            .and_then(Value::as_i64)
            .map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    /// Get a column as a long integer, or `default` when NULL, absent, or
    /// not numeric
    pub fn get_long(&mut self, column: &str, default: i64) -> i64 {
        self.cell(column).and_then(Value::as_i64).unwrap_or(default)
    }

    /// Get a column as a boolean, false when NULL or absent
    pub fn get_bool(&mut self, column: &str) -> bool {
        self.cell(column).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Whether a column is NULL or absent
    pub fn is_null(&mut self, column: &str) -> bool {
        self.cell(column).map_or(true, Value::is_null)
    }

    /// Columns of the current row not read through a getter
    pub fn attributes(&self) -> IndexMap<String, Value> {
        let Some(row) = self.current.as_ref() else {
            return IndexMap::new();
        };
        self.source
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.read_columns.contains(i))
            .filter_map(|(i, name)| row.get(i).map(|v| (name.clone(), v.clone())))
            .collect()
    }

    /// Release the source. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.current = None;
        if let Err(e) = self.source.close() {
            warn!(error = %e, "Could not release metadata rows");
        }
    }

    /// Whether the source has been released
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for MetadataRowCursor<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

/// An in-memory row source
#[derive(Debug, Clone, Default)]
pub struct VecRowSource {
    columns: Vec<String>,
    rows: std::collections::VecDeque<Vec<Value>>,
}

impl VecRowSource {
    /// Create a row source over the given rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }
}

impl RowSource for VecRowSource {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }
}
