//! Reader for delimited text tables (CSV, TSV).

use crate::error::{ReconcileError, Result};
use crate::table::{DataTable, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

/// Cell contents read as a missing value unless configured otherwise.
const DEFAULT_MISSING_TOKENS: [&str; 2] = ["", "NA"];

/// Delimiter for a file, derived from its extension: tab for `.tsv`/`.tab`/`.txt`,
/// comma otherwise.
pub(crate) fn delimiter_for_path(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tsv" | "tab" | "txt") => b'\t',
        _ => b',',
    }
}

// =#========================================================================#=
// TABLE READER
// =#========================================================================#=
/// Configurable reader for delimited tables with a header line.
///
/// Each column is typed on its own: if every non-missing cell parses as a
/// number, the column holds [Value::Number]s, otherwise [Value::Text].
/// Columns registered via [with_text_column](Self::with_text_column) are
/// always read as text (useful for name columns like `"001"`).
///
/// # Example
/// ```
/// use phylomatch::table::{TableReader, Value};
///
/// let table = TableReader::new()
///     .with_row_names("species")
///     .read_str("species,mass,diet\nKea,0.9,omnivore\nKaka,NA,\n")
///     .unwrap();
///
/// assert_eq!(table.columns(), ["mass", "diet"]);
/// assert_eq!(table.row(0).unwrap().row_name(), Some("Kea"));
/// assert_eq!(table.row(0).unwrap().number("mass"), Some(0.9));
/// assert_eq!(table.row(1).unwrap().get("diet"), Some(&Value::Missing));
/// ```
#[derive(Debug, Clone)]
pub struct TableReader {
    delimiter: Option<u8>,
    row_names: Option<String>,
    text_columns: HashSet<String>,
    missing_tokens: Vec<String>,
}

impl Default for TableReader {
    fn default() -> Self {
        Self {
            delimiter: None,
            row_names: None,
            text_columns: HashSet::new(),
            missing_tokens: DEFAULT_MISSING_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// New, Configuration (pub)
// ============================================================================
impl TableReader {
    /// Creates a reader with default settings: delimiter from the file
    /// extension (comma for strings), no row names, `""` and `NA` as missing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given field delimiter instead of guessing it.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Moves the column `column` out of the data and uses it as row names.
    pub fn with_row_names(mut self, column: impl Into<String>) -> Self {
        self.row_names = Some(column.into());
        self
    }

    /// Always reads `column` as text.
    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.text_columns.insert(column.into());
        self
    }

    /// Reads every column that holds text in `template` as text.
    ///
    /// With this, a table written by [TableWriter](crate::table::TableWriter)
    /// reads back with its column types, so text like `"001"` stays text.
    /// Add `with_missing_tokens(["NA"])` to keep empty text cells as text.
    ///
    /// # Example
    /// ```
    /// use phylomatch::table::{DataTable, TableReader, TableWriter, Value};
    ///
    /// let table = DataTable::from_rows(
    ///     vec!["id".into(), "mass".into()],
    ///     vec![vec!["001".into(), Value::Number(0.9)]],
    /// )
    /// .unwrap();
    /// let text = TableWriter::new().to_string(&table).unwrap();
    ///
    /// let back = TableReader::new()
    ///     .with_column_types_from(&table)
    ///     .read_str(&text)
    ///     .unwrap();
    /// assert_eq!(back, table);
    /// ```
    pub fn with_column_types_from(mut self, template: &DataTable) -> Self {
        for (col, name) in template.columns().iter().enumerate() {
            if template
                .rows()
                .any(|row| matches!(row.values().get(col), Some(Value::Text(_))))
            {
                self.text_columns.insert(name.clone());
            }
        }
        self
    }

    /// Replaces the set of cell contents that are read as missing values.
    pub fn with_missing_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Reading (pub)
// ============================================================================
impl TableReader {
    /// Reads the table in the file at `path`.
    ///
    /// # Errors
    /// * [ReconcileError::Io] if the file cannot be opened
    /// * [ReconcileError::Csv] if the content is not a well-formed delimited table
    /// * [ReconcileError::ColumnNotFound] if the row name column does not exist
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<DataTable> {
        let path = path.as_ref();
        let delimiter = self.delimiter.unwrap_or_else(|| delimiter_for_path(path));
        let table = self.read_from(File::open(path)?, delimiter)?;
        debug!(
            path = %path.display(),
            rows = table.num_rows(),
            columns = table.num_columns(),
            "read table"
        );
        Ok(table)
    }

    /// Reads a table from a string (comma-delimited unless configured).
    ///
    /// # Errors
    /// See [read_file](Self::read_file).
    pub fn read_str(&self, content: &str) -> Result<DataTable> {
        self.read_from(content.as_bytes(), self.delimiter.unwrap_or(b','))
    }

    /// Reads a table from any reader with the given delimiter.
    ///
    /// # Errors
    /// See [read_file](Self::read_file).
    pub fn read_from<R: io::Read>(&self, reader: R, delimiter: u8) -> Result<DataTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
        let mut cells: Vec<Vec<String>> = Vec::new();
        for record in csv_reader.records() {
            cells.push(record?.iter().map(String::from).collect());
        }

        let name_col = match &self.row_names {
            Some(column) => Some(headers.iter().position(|h| h == column).ok_or_else(|| {
                ReconcileError::ColumnNotFound {
                    column: column.clone(),
                    available: headers.clone(),
                }
            })?),
            None => None,
        };

        self.build_table(headers, cells, name_col)
    }
}

// ============================================================================
// Typing (private)
// ============================================================================
impl TableReader {
    fn build_table(
        &self,
        headers: Vec<String>,
        cells: Vec<Vec<String>>,
        name_col: Option<usize>,
    ) -> Result<DataTable> {
        let data_cols: Vec<usize> = (0..headers.len()).filter(|&c| Some(c) != name_col).collect();
        let numeric: Vec<bool> = data_cols
            .iter()
            .map(|&c| self.is_numeric_column(&headers[c], &cells, c))
            .collect();

        let columns = data_cols.iter().map(|&c| headers[c].clone()).collect();
        let mut table = match name_col {
            Some(_) => DataTable::with_row_names(columns),
            None => DataTable::new(columns),
        };

        for record in &cells {
            let values = data_cols
                .iter()
                .zip(&numeric)
                .map(|(&c, &is_num)| self.to_value(&record[c], is_num))
                .collect();
            match name_col {
                Some(c) => {
                    let name = Some(record[c].as_str())
                        .filter(|s| !self.is_missing(s))
                        .map(String::from);
                    table.push_named_row(name, values)?;
                }
                None => table.push_row(values)?,
            }
        }

        Ok(table)
    }

    fn is_numeric_column(&self, header: &str, cells: &[Vec<String>], col: usize) -> bool {
        !self.text_columns.contains(header)
            && cells
                .iter()
                .map(|record| record[col].as_str())
                .filter(|cell| !self.is_missing(cell))
                .all(|cell| cell.parse::<f64>().is_ok())
    }

    fn to_value(&self, cell: &str, numeric: bool) -> Value {
        if self.is_missing(cell) {
            Value::Missing
        } else if numeric {
            // NaN maps to Missing
            cell.parse::<f64>().map_or(Value::Missing, Value::from)
        } else {
            Value::Text(cell.to_string())
        }
    }

    fn is_missing(&self, cell: &str) -> bool {
        self.missing_tokens.iter().any(|t| t == cell)
    }
}
