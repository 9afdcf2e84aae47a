//! Loader: reads the delivery CSV into an untyped in-memory table.
//!
//! RULE: The loader never interprets cell contents. Every cell is kept as
//! trimmed text, empty cells become `None`. Typing happens in the normalizer.

use crate::error::{DashError, DashResult};
use std::io::Read;
use std::path::Path;

/// A header plus rows of optional text cells, exactly as read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let mut row: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| c.map(Into::into).and_then(clean_cell))
            .collect();
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, column), if present and non-empty.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}

/// Read a CSV file from disk.
pub fn load_csv(path: &Path) -> DashResult<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| DashError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_csv(file)?;
    log::info!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Read CSV from any reader. The first record is the header.
pub fn read_csv<R: Read>(reader: R) -> DashResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashError::EmptyHeader);
    }

    let mut table = RawTable::new(headers);
    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(Some));
    }
    Ok(table)
}

fn clean_cell(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == raw.len() {
        Some(raw)
    } else {
        Some(trimmed.to_string())
    }
}
