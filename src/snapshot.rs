// src/snapshot.rs

use anyhow::{Context, Result};
use rusqlite::{params_from_iter, types::Value, Connection};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::process::deal::Deal;
use crate::process::investors::DealInvestor;
use crate::process::raw_table::RawTable;
use crate::schema::types::{Cell, ColumnKind, ColumnSpec, OutputFormat, TableRecord};
use crate::schema::write::StagedOutput;

fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Int | ColumnKind::Flag => "INTEGER",
        ColumnKind::Float => "REAL",
        ColumnKind::Text | ColumnKind::Date => "TEXT",
    }
}

fn to_sql_value(cell: Cell<'_>) -> Value {
    match cell {
        Cell::Int(Some(v)) => Value::Integer(v),
        Cell::Float(Some(v)) => Value::Real(v),
        Cell::Text(Some(s)) => Value::Text(s.to_string()),
        Cell::Date(Some(d)) => Value::Text(d.format("%Y-%m-%d").to_string()),
        Cell::Flag(v) => Value::Integer(i64::from(v)),
        Cell::Int(None) | Cell::Float(None) | Cell::Text(None) | Cell::Date(None) => Value::Null,
    }
}

fn text_to_sql_value(spec: &ColumnSpec, raw: &str) -> Result<Value> {
    if raw.is_empty() {
        return Ok(match spec.kind {
            ColumnKind::Text if !spec.nullable => Value::Text(String::new()),
            _ => Value::Null,
        });
    }
    let value = match spec.kind {
        ColumnKind::Int | ColumnKind::Flag => Value::Integer(
            raw.parse()
                .with_context(|| format!("column `{}`: bad integer {:?}", spec.name, raw))?,
        ),
        ColumnKind::Float => Value::Real(
            raw.parse()
                .with_context(|| format!("column `{}`: bad number {:?}", spec.name, raw))?,
        ),
        ColumnKind::Text | ColumnKind::Date => Value::Text(raw.to_string()),
    };
    Ok(value)
}

/// `DROP TABLE IF EXISTS` + `CREATE TABLE` for one table.
fn create_sql(table: &str, columns: &[ColumnSpec]) -> String {
    let cols: Vec<String> = columns
        .iter()
        .map(|c| {
            let not_null = if c.nullable { "" } else { " NOT NULL" };
            format!("\"{}\" {}{}", c.name, sql_type(c.kind), not_null)
        })
        .collect();
    format!(
        "DROP TABLE IF EXISTS \"{t}\";\nCREATE TABLE \"{t}\" (\n    {}\n);",
        cols.join(",\n    "),
        t = table
    )
}

fn replace_rows<I>(conn: &Connection, table: &str, columns: &[ColumnSpec], rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<Value>>,
{
    conn.execute_batch(&create_sql(table, columns))
        .with_context(|| format!("creating table `{}`", table))?;

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let insert = format!(
        "INSERT INTO \"{}\" VALUES ({})",
        table,
        placeholders.join(", ")
    );
    let mut stmt = conn
        .prepare(&insert)
        .with_context(|| format!("preparing insert into `{}`", table))?;

    let mut n = 0;
    for row in rows {
        stmt.execute(params_from_iter(row))
            .with_context(|| format!("inserting into `{}`", table))?;
        n += 1;
    }
    Ok(n)
}

/// Replace table `T` in `conn` with `records`. Runs in the caller's transaction.
pub fn replace_table<T: TableRecord>(conn: &Connection, records: &[T]) -> Result<usize> {
    let rows = records
        .iter()
        .map(|r| r.cells().into_iter().map(to_sql_value).collect());
    replace_rows(conn, T::TABLE, T::columns(), rows)
}

/// Read a cleaned CSV written for `T` back into SQL values, column by column.
pub fn load_clean_csv<T: TableRecord>(path: &Path) -> Result<Vec<Vec<Value>>> {
    let table = RawTable::load(path)?;
    let columns = T::columns();
    if let Some(missing) = columns.iter().find(|c| !table.has_column(c.name)) {
        anyhow::bail!(
            "{} has no `{}` column; not a `{}` export",
            path.display(),
            missing.name,
            T::TABLE
        );
    }

    table
        .iter()
        .enumerate()
        .map(|(i, row)| {
            columns
                .iter()
                .map(|c| text_to_sql_value(c, row.get(c.name)))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("{} line {}", path.display(), i + 2))
        })
        .collect()
}

/// Assemble a database at a temp path next to `db_path`, registered with
/// `staged`. Nothing reaches `db_path` until the caller commits.
fn build_database<F>(staged: &mut StagedOutput, db_path: &Path, fill: F) -> Result<PathBuf>
where
    F: FnOnce(&Connection) -> Result<()>,
{
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
    }

    let tmp = staged.stage(db_path);
    if tmp.exists() {
        fs::remove_file(&tmp).with_context(|| format!("removing stale {}", tmp.display()))?;
    }

    let mut conn = Connection::open(&tmp).with_context(|| format!("opening {}", tmp.display()))?;
    let tx = conn.transaction().context("starting snapshot transaction")?;
    fill(&tx)?;
    tx.commit().context("committing snapshot transaction")?;
    Ok(tmp)
}

/// Stage a SQLite database holding the `deals` and `deal_investors` tables
/// alongside the other outputs in `staged`. Returns the temp path.
#[tracing::instrument(level = "info", skip(staged, deals, investors), fields(path = %db_path.display()))]
pub fn stage_sqlite_snapshot(
    staged: &mut StagedOutput,
    db_path: &Path,
    deals: &[Deal],
    investors: &[DealInvestor],
) -> Result<PathBuf> {
    let tmp = build_database(staged, db_path, |conn| {
        replace_table(conn, deals)?;
        replace_table(conn, investors)?;
        Ok(())
    })?;
    info!(deals = deals.len(), investors = investors.len(), "staged SQLite snapshot");
    Ok(tmp)
}

/// Write the SQLite snapshot on its own. A failure leaves any earlier
/// database as it was.
pub fn write_sqlite_snapshot(
    db_path: &Path,
    deals: &[Deal],
    investors: &[DealInvestor],
) -> Result<PathBuf> {
    let mut staged = StagedOutput::new();
    stage_sqlite_snapshot(&mut staged, db_path, deals, investors)?;
    staged.commit()?;
    Ok(db_path.to_path_buf())
}

/// Same snapshot, built from the cleaned CSVs of an earlier run in `out_dir`.
#[tracing::instrument(level = "info", fields(out_dir = %out_dir.display(), path = %db_path.display()))]
pub fn snapshot_from_csv(out_dir: &Path, db_path: &Path) -> Result<PathBuf> {
    let deals = load_clean_csv::<Deal>(&out_dir.join(OutputFormat::Csv.file_name(Deal::TABLE)))?;
    let investors = load_clean_csv::<DealInvestor>(
        &out_dir.join(OutputFormat::Csv.file_name(DealInvestor::TABLE)),
    )?;
    let (n_deals, n_investors) = (deals.len(), investors.len());

    let mut staged = StagedOutput::new();
    build_database(&mut staged, db_path, |conn| {
        replace_rows(conn, Deal::TABLE, Deal::columns(), deals)?;
        replace_rows(conn, DealInvestor::TABLE, DealInvestor::columns(), investors)?;
        Ok(())
    })?;
    staged.commit()?;
    info!(deals = n_deals, investors = n_investors, "wrote SQLite snapshot from CSV");
    Ok(db_path.to_path_buf())
}
