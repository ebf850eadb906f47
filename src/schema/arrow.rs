// src/schema/arrow.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Date32Builder, Float64Builder, Int64Builder, StringBuilder, UInt8Builder},
    datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use super::types::{Cell, ColumnKind, ColumnSpec, TableRecord};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Map an output column kind into an Arrow DataType.
///
/// - Int   → Int64
/// - Float → Float64
/// - Text  → Utf8
/// - Date  → Date32
/// - Flag  → UInt8
pub fn map_to_arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Int => DataType::Int64,
        ColumnKind::Float => DataType::Float64,
        ColumnKind::Text => DataType::Utf8,
        ColumnKind::Date => DataType::Date32,
        ColumnKind::Flag => DataType::UInt8,
    }
}

/// Build an ArrowSchema (inside an Arc) from a slice of `ColumnSpec`s.
pub fn build_arrow_schema(cols: &[ColumnSpec]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| ArrowField::new(col.name, map_to_arrow_type(col.kind), col.nullable))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

fn date_to_days(d: NaiveDate) -> i32 {
    d.num_days_from_ce() - UNIX_EPOCH_CE_DAYS
}

/// One column builder per output column.
enum ColumnBuilder {
    Int(Int64Builder),
    Float(Float64Builder),
    Text(StringBuilder),
    Date(Date32Builder),
    Flag(UInt8Builder),
}

impl ColumnBuilder {
    fn new(kind: ColumnKind, capacity: usize) -> Self {
        match kind {
            ColumnKind::Int => ColumnBuilder::Int(Int64Builder::with_capacity(capacity)),
            ColumnKind::Float => ColumnBuilder::Float(Float64Builder::with_capacity(capacity)),
            ColumnKind::Text => {
                ColumnBuilder::Text(StringBuilder::with_capacity(capacity, capacity * 16))
            }
            ColumnKind::Date => ColumnBuilder::Date(Date32Builder::with_capacity(capacity)),
            ColumnKind::Flag => ColumnBuilder::Flag(UInt8Builder::with_capacity(capacity)),
        }
    }

    fn append(&mut self, cell: Cell<'_>, column: &str) -> Result<()> {
        match (self, cell) {
            (ColumnBuilder::Int(b), Cell::Int(v)) => b.append_option(v),
            (ColumnBuilder::Float(b), Cell::Float(v)) => b.append_option(v),
            (ColumnBuilder::Text(b), Cell::Text(v)) => b.append_option(v),
            (ColumnBuilder::Date(b), Cell::Date(v)) => b.append_option(v.map(date_to_days)),
            (ColumnBuilder::Flag(b), Cell::Flag(v)) => b.append_value(v),
            (_, other) => anyhow::bail!("column `{}` got mismatched cell {:?}", column, other),
        }
        Ok(())
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Int(b) => Arc::new(b.finish()),
            ColumnBuilder::Float(b) => Arc::new(b.finish()),
            ColumnBuilder::Text(b) => Arc::new(b.finish()),
            ColumnBuilder::Date(b) => Arc::new(b.finish()),
            ColumnBuilder::Flag(b) => Arc::new(b.finish()),
        }
    }
}

/// Convert records into one RecordBatch with the table's schema.
pub fn to_record_batch<T: TableRecord>(records: &[T]) -> Result<RecordBatch> {
    let columns = T::columns();
    let schema = build_arrow_schema(columns);

    let mut builders: Vec<ColumnBuilder> = columns
        .iter()
        .map(|c| ColumnBuilder::new(c.kind, records.len()))
        .collect();

    for record in records {
        for ((builder, spec), cell) in builders.iter_mut().zip(columns).zip(record.cells()) {
            builder.append(cell, spec.name)?;
        }
    }

    let arrays: Vec<ArrayRef> = builders.iter_mut().map(ColumnBuilder::finish).collect();
    RecordBatch::try_new(schema, arrays)
        .with_context(|| format!("building `{}` record batch", T::TABLE))
}
