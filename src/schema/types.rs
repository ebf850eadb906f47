// src/schema/types.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::process::parsed::Parsed;

/// Storage type of one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 64-bit integer, nullable unless it is a key
    Int,
    Float,
    Text,
    /// calendar date, ISO text in CSV/SQLite
    Date,
    /// 0/1, never null
    Flag,
}

/// A single output column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: !matches!(kind, ColumnKind::Flag),
        }
    }

    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }
}

/// One value of a record, tagged with its storage type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<&'a str>),
    Date(Option<NaiveDate>),
    Flag(u8),
}

impl<'a> Cell<'a> {
    pub fn text(s: &'a str) -> Self {
        Cell::Text(Some(s))
    }

    pub fn int(p: Parsed<i64>) -> Self {
        Cell::Int(p.into())
    }

    pub fn float(p: Parsed<f64>) -> Self {
        Cell::Float(p.into())
    }

    pub fn date(p: Parsed<NaiveDate>) -> Self {
        Cell::Date(p.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Cell::Int(None) | Cell::Float(None) | Cell::Text(None) | Cell::Date(None)
        )
    }
}

/// A row type of one of the output tables.
pub trait TableRecord: Serialize + Sync {
    /// Table name in the SQLite snapshot.
    const TABLE: &'static str;

    /// Columns, in output order. Must match the serde field order.
    fn columns() -> &'static [ColumnSpec];

    /// Values in the order of [`TableRecord::columns`].
    fn cells(&self) -> Vec<Cell<'_>>;
}

/// On-disk format of the two output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }

    /// Final file name for `table` ("deals" or "deal_investors").
    pub fn file_name(&self, table: &str) -> String {
        match self {
            OutputFormat::Csv => format!("{}_clean.csv", table),
            OutputFormat::Parquet => format!("{}.parquet", table),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
