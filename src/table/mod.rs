//! Tabular per-taxon data.
//!
//! A [DataTable] is a rectangular table of [Value]s with named columns and,
//! optionally, a separate list of row names (the way R data frames carry
//! them). Which of these identifies the taxon of a row is chosen by a
//! [NameKey]; resolving it against a table gives a [KeyHandle] that is
//! cheap to copy and stays valid for any table derived from it by row
//! selection.
//!
//! Tables are read with [TableReader] and written with [TableWriter].
//!
//! # Example
//! ```
//! use phylomatch::table::{DataTable, NameKey, Value};
//!
//! let mut table = DataTable::new(vec!["species".into(), "mass".into()]);
//! table.push_row(vec!["Kea".into(), Value::Number(0.9)]).unwrap();
//! table.push_row(vec!["Kakapo".into(), Value::Missing]).unwrap();
//!
//! let key = table.resolve_key(&NameKey::column("species")).unwrap();
//! assert_eq!(table.name_of(key, 1).as_deref(), Some("Kakapo"));
//! assert!(table.row(1).unwrap().is_missing("mass"));
//! ```

mod reader;
mod value;
mod writer;

pub use self::reader::TableReader;
pub use self::value::{MISSING_TOKEN, Value};
pub use self::writer::TableWriter;

use crate::error::{ReconcileError, Result};
use std::fmt;

/// Label used in errors when row names are requested but absent.
const ROW_NAMES_LABEL: &str = "<row names>";

// =#========================================================================#=
// NAME KEY
// =#========================================================================#=
/// Where the taxon name of a row is found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameKey {
    /// A named column of the table
    Column(String),
    /// The row names of the table
    RowNames,
}

impl NameKey {
    /// Convenience constructor for [NameKey::Column].
    pub fn column(name: impl Into<String>) -> Self {
        NameKey::Column(name.into())
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        NameKey::column(name)
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKey::Column(name) => write!(f, "column '{name}'"),
            NameKey::RowNames => f.write_str("row names"),
        }
    }
}

/// A [NameKey] resolved against a table's columns.
///
/// Obtained from [DataTable::resolve_key]. Tables produced by
/// [DataTable::select_rows] and [DataTable::filter_rows] keep their columns,
/// so a handle stays valid for them. [DataTable::with_column] inserts a
/// leading column; a handle for the old table is off by one there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHandle(KeySource);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySource {
    Column(usize),
    RowNames,
}

impl KeyHandle {
    /// The same key after `by` columns were inserted in front of the table.
    pub(crate) fn shifted(self, by: usize) -> KeyHandle {
        match self.0 {
            KeySource::Column(col) => KeyHandle(KeySource::Column(col + by)),
            KeySource::RowNames => self,
        }
    }
}

// =#========================================================================#=
// DATA TABLE
// =#========================================================================#=
/// Rectangular table of per-taxon data.
///
/// Every row has exactly one value per column. Row names are either absent
/// or present for every row (individual names may be missing).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    row_names: Option<Vec<Option<String>>>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl DataTable {
    /// Creates an empty table with the given columns and no row names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            row_names: None,
        }
    }

    /// Creates an empty table with the given columns that carries row names.
    pub fn with_row_names(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            row_names: Some(Vec::new()),
        }
    }

    /// Creates a table from columns and rows.
    ///
    /// # Errors
    /// [ReconcileError::Table] if a row does not have one value per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row to a table without row names.
    ///
    /// # Errors
    /// [ReconcileError::Table] if the number of values does not match the
    /// number of columns, or if the table carries row names (use
    /// [push_named_row](Self::push_named_row) then).
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if self.row_names.is_some() {
            return Err(ReconcileError::Table(
                "table has row names, rows must be pushed with a name".to_string(),
            ));
        }
        self.check_width(&values)?;
        self.rows.push(values);
        Ok(())
    }

    /// Appends a row with a (possibly missing) row name.
    ///
    /// # Errors
    /// [ReconcileError::Table] if the number of values does not match the
    /// number of columns, or if the table has no row names.
    pub fn push_named_row(&mut self, name: Option<String>, values: Vec<Value>) -> Result<()> {
        self.check_width(&values)?;
        match self.row_names.as_mut() {
            Some(names) => names.push(name),
            None => {
                return Err(ReconcileError::Table(
                    "table has no row names".to_string(),
                ));
            }
        }
        self.rows.push(values);
        Ok(())
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_row_names(&self) -> bool {
        self.row_names.is_some()
    }

    /// Row names, if the table carries them.
    pub fn row_names(&self) -> Option<&[Option<String>]> {
        self.row_names.as_deref()
    }

    /// Index of the column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the row at `index`, if there is one.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    /// All values of one column, in row order.
    ///
    /// # Errors
    /// [ReconcileError::ColumnNotFound] if there is no such column.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let col = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[col]).collect())
    }
}

// ============================================================================
// Name Keys (pub)
// ============================================================================
impl DataTable {
    /// Resolves where the taxon names of this table are found.
    ///
    /// # Errors
    /// [ReconcileError::ColumnNotFound] if the column does not exist or, for
    /// [NameKey::RowNames], if the table has no row names.
    pub fn resolve_key(&self, key: &NameKey) -> Result<KeyHandle> {
        match key {
            NameKey::Column(name) => Ok(KeyHandle(KeySource::Column(self.require_column(name)?))),
            NameKey::RowNames if self.has_row_names() => Ok(KeyHandle(KeySource::RowNames)),
            NameKey::RowNames => Err(ReconcileError::ColumnNotFound {
                column: ROW_NAMES_LABEL.to_string(),
                available: self.columns.clone(),
            }),
        }
    }

    /// Taxon name of row `index` under `key`; `None` if the name is missing
    /// or the row does not exist.
    pub fn name_of(&self, key: KeyHandle, index: usize) -> Option<String> {
        match key.0 {
            KeySource::Column(col) => self.rows.get(index)?.get(col)?.as_name(),
            KeySource::RowNames => self.row_names.as_ref()?.get(index)?.clone(),
        }
    }

    /// Taxon names of all rows under `key`, in row order.
    pub fn names(&self, key: KeyHandle) -> Vec<Option<String>> {
        (0..self.num_rows()).map(|i| self.name_of(key, i)).collect()
    }
}

// ============================================================================
// Derived Tables (pub)
// ============================================================================
impl DataTable {
    /// New table with the rows at `indices`, in that order.
    ///
    /// Columns and row names (if any) are carried over.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> DataTable {
        DataTable {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            row_names: self
                .row_names
                .as_ref()
                .map(|names| indices.iter().map(|&i| names[i].clone()).collect()),
        }
    }

    /// New table with the rows that satisfy `predicate`, in their current order.
    pub fn filter_rows<F>(&self, predicate: F) -> DataTable
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let indices: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index())
            .collect();
        self.select_rows(&indices)
    }

    /// New table with an additional leading column `name` holding `values`.
    ///
    /// # Errors
    /// * [ReconcileError::DuplicateColumn] if the table already has such a column
    /// * [ReconcileError::Table] if there is not one value per row
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<DataTable> {
        if self.column_index(name).is_some() {
            return Err(ReconcileError::DuplicateColumn(name.to_string()));
        }
        if values.len() != self.num_rows() {
            return Err(ReconcileError::Table(format!(
                "column '{name}' has {} values, but table has {} rows",
                values.len(),
                self.num_rows()
            )));
        }

        let mut columns = Vec::with_capacity(self.num_columns() + 1);
        columns.push(name.to_string());
        columns.extend(self.columns.iter().cloned());

        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| {
                let mut new_row = Vec::with_capacity(row.len() + 1);
                new_row.push(value);
                new_row.extend(row.iter().cloned());
                new_row
            })
            .collect();

        Ok(DataTable {
            columns,
            rows,
            row_names: self.row_names.clone(),
        })
    }
}

// ============================================================================
// Helpers (private)
// ============================================================================
impl DataTable {
    fn check_width(&self, values: &[Value]) -> Result<()> {
        if values.len() == self.columns.len() {
            Ok(())
        } else {
            Err(ReconcileError::Table(format!(
                "row {} has {} values, expected {}",
                self.rows.len(),
                values.len(),
                self.columns.len()
            )))
        }
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ReconcileError::ColumnNotFound {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    pub(crate) fn values(&self, index: usize) -> &[Value] {
        &self.rows[index]
    }
}

// =#========================================================================#=
// ROW
// =#========================================================================#=
/// Borrowed view of one row of a [DataTable].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a DataTable,
    index: usize,
}

impl<'a> Row<'a> {
    /// Position of this row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Row name, if the table carries row names and this row has one.
    pub fn row_name(&self) -> Option<&'a str> {
        self.table.row_names.as_ref()?.get(self.index)?.as_deref()
    }

    /// Taxon name of this row under `key`.
    pub fn name(&self, key: KeyHandle) -> Option<String> {
        self.table.name_of(key, self.index)
    }

    /// All values of this row, in column order.
    pub fn values(&self) -> &'a [Value] {
        self.table.values(self.index)
    }

    /// Value in `column`, or `None` if there is no such column.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let col = self.table.column_index(column)?;
        self.values().get(col)
    }

    /// Numeric value in `column`, if it is a number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    /// Text value in `column`, if it is text.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Value::as_text)
    }

    /// Whether the value in `column` is missing. Unknown columns count as missing.
    pub fn is_missing(&self, column: &str) -> bool {
        self.get(column).is_none_or(Value::is_missing)
    }
}
