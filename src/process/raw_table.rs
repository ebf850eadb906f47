use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rayon::prelude::*;
use std::{collections::HashMap, fs::File, io::Read, path::Path};
use tracing::{debug, warn};

use crate::process::utils::clean_str;

const UTF8_BOM: char = '\u{feff}';

/// The wide source sheet, every cell kept as text.
#[derive(Debug, Default)]
pub struct RawTable {
    /// Column names from the header row, trimmed.
    pub headers: Vec<String>,
    /// Data rows, each padded or cut to `headers.len()`.
    pub rows: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

/// One source row addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    table: &'a RawTable,
    cells: &'a [String],
}

impl<'a> RawRow<'a> {
    /// Raw text of `column`; "" when the column is not in the sheet.
    pub fn get(&self, column: &str) -> &'a str {
        self.table
            .index
            .get(column)
            .and_then(|&i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, h) in headers.iter().enumerate() {
            // first occurrence wins on duplicate headers
            if index.contains_key(h) {
                warn!(column = %h, "duplicate column header, keeping the first");
                continue;
            }
            index.insert(h.clone(), i);
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self {
            headers,
            rows,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn row(&self, i: usize) -> Option<RawRow<'_>> {
        self.rows.get(i).map(|cells| RawRow { table: self, cells })
    }

    /// Rows in input order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = RawRow<'_>> + '_ {
        self.rows.iter().map(move |cells| RawRow { table: self, cells })
    }

    /// Rows in input order, for indexed parallel work.
    pub fn par_iter(&self) -> impl IndexedParallelIterator<Item = RawRow<'_>> + '_ {
        self.rows
            .par_iter()
            .map(move |cells| RawRow { table: self, cells })
    }

    /// Parse CSV text with a header row. No type inference: every cell
    /// stays a string, undecodable bytes are replaced lossily.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // short rows are padded with ""
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()
            .context("reading CSV header row")?
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let decoded = String::from_utf8_lossy(raw);
                let name = if i == 0 {
                    decoded.trim_start_matches(UTF8_BOM)
                } else {
                    decoded.as_ref()
                };
                clean_str(name)
            })
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in rdr.byte_records().enumerate() {
            let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect::<Vec<_>>(),
            );
        }

        debug!(columns = headers.len(), rows = rows.len(), "loaded raw table");
        Ok(Self::new(headers, rows))
    }

    /// Load the source CSV at `path`.
    #[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("raw source `{}` does not exist or is not a file", path.display());
        }
        let file =
            File::open(path).with_context(|| format!("opening raw source {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("reading raw source {}", path.display()))
    }
}
