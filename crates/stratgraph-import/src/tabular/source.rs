//! Source abstraction: one shared row-processing algorithm over any
//! column-oriented, string-valued table.

use crate::error::ImportError;

/// A sheet-like source of rows keyed by header name. Implementations read
/// whatever backing store they like (delimited text, a spreadsheet, a SQL
/// query) and present it uniformly to the row-processing algorithm.
pub trait TableSource {
    /// Column headers in source order.
    fn headers(&self) -> &[String];

    /// Rows in source order, one `Vec<Option<String>>` per row aligned to
    /// `headers()`. `None` denotes a null cell (empty, `NA`, `N/A`).
    fn rows(&self) -> &[Vec<Option<String>>];
}

/// CSV/delimited-text backend, standing in for "spreadsheet or external
/// relational source".
pub struct CsvTableSource {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl CsvTableSource {
    /// Read a CSV file into memory. `start_row` is the first real data row,
    /// 1-based over the whole sheet including the header row (so the
    /// conventional "no tutorial rows" value is 2, which skips nothing).
    pub fn from_path(path: &std::path::Path, start_row: usize) -> Result<Self, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound(path.display().to_string()));
        }
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        Self::from_reader(&mut reader, start_row)
    }

    fn from_reader<R: std::io::Read>(reader: &mut csv::Reader<R>, start_row: usize) -> Result<Self, ImportError> {
        let headers = reader.headers()?.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        let trimmed = cell.trim();
                        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("n/a") {
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    })
                    .collect(),
            );
        }
        let skip = start_row.saturating_sub(2);
        if skip > 0 {
            rows = rows.into_iter().skip(skip).collect();
        }
        Ok(CsvTableSource { headers, rows })
    }

    #[cfg(test)]
    pub fn from_str(text: &str, start_row: usize) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(text.as_bytes());
        Self::from_reader(&mut reader, start_row)
    }
}

impl TableSource for CsvTableSource {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }
}
