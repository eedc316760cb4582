//! Writer for delimited text tables (CSV, TSV).

use crate::error::{ReconcileError, Result};
use crate::table::reader::delimiter_for_path;
use crate::table::{DataTable, MISSING_TOKEN, Value};
use std::fs::File;
use std::io;
use std::path::Path;

/// Header of the row name column, as R writes it.
const ROW_NAMES_HEADER: &str = "";

/// Writer for [DataTable]s in delimited text format.
///
/// Row names, if present, are written as a leading column with an empty
/// header; missing values are written as `NA`. A text cell or row name equal
/// to the missing token is rejected, as it would read back as missing.
/// Numbers are written in their shortest exact form.
///
/// Read a written table back with
/// [TableReader::with_column_types_from](crate::table::TableReader::with_column_types_from)
/// to keep text columns such as `"001"` as text.
///
/// # Example
/// ```
/// use phylomatch::table::{DataTable, TableWriter, Value};
///
/// let mut table = DataTable::with_row_names(vec!["mass".into()]);
/// table.push_named_row(Some("Kea".into()), vec![Value::Number(0.9)]).unwrap();
/// table.push_named_row(Some("Kaka".into()), vec![Value::Missing]).unwrap();
///
/// let text = TableWriter::new().to_string(&table).unwrap();
/// assert_eq!(text, ",mass\nKea,0.9\nKaka,NA\n");
/// ```
#[derive(Debug, Clone)]
pub struct TableWriter {
    delimiter: Option<u8>,
    missing_token: String,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self {
            delimiter: None,
            missing_token: MISSING_TOKEN.to_string(),
        }
    }
}

impl TableWriter {
    /// Creates a writer with default settings: delimiter from the file
    /// extension (comma otherwise), `NA` for missing values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Writes missing values as `token`.
    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.missing_token = token.into();
        self
    }

    /// Writes `table` to the file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or writing fails.
    pub fn write_file<P: AsRef<Path>>(&self, path: P, table: &DataTable) -> Result<()> {
        let path = path.as_ref();
        let delimiter = self.delimiter.unwrap_or_else(|| delimiter_for_path(path));
        self.write_to(File::create(path)?, table, delimiter)
    }

    /// Writes `table` into a string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_string(&self, table: &DataTable) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, table, self.delimiter.unwrap_or(b','))?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes `table` to any writer with the given delimiter.
    ///
    /// # Errors
    /// * [ReconcileError::Table] if a text cell or row name equals the missing token
    /// * [ReconcileError::Csv] if writing fails
    pub fn write_to<W: io::Write>(&self, writer: W, table: &DataTable, delimiter: u8) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        let row_names = table.row_names();
        let mut header: Vec<&str> = Vec::with_capacity(table.num_columns() + 1);
        if row_names.is_some() {
            header.push(ROW_NAMES_HEADER);
        }
        header.extend(table.columns().iter().map(String::as_str));
        csv_writer.write_record(&header)?;

        for row in table.rows() {
            let mut record: Vec<String> = Vec::with_capacity(header.len());
            if row_names.is_some() {
                match row.row_name() {
                    Some(name) => record.push(self.checked_text(name, row.index())?),
                    None => record.push(self.missing_token.clone()),
                }
            }
            for value in row.values() {
                record.push(match value {
                    Value::Missing => self.missing_token.clone(),
                    Value::Text(text) => self.checked_text(text, row.index())?,
                    Value::Number(_) => value.to_string(),
                });
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn checked_text(&self, text: &str, row: usize) -> Result<String> {
        if text == self.missing_token {
            return Err(ReconcileError::Table(format!(
                "text '{text}' in row {row} equals the missing token and would read back as missing"
            )));
        }
        Ok(text.to_string())
    }
}
