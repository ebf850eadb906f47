// src/process/pipeline.rs

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::config::EtlConfig;
use crate::process::deal::{build_deal, Deal, StagingId};
use crate::process::investors::{build_investors, DealInvestor, Roster};
use crate::process::raw_table::RawTable;
use crate::schema::types::{OutputFormat, TableRecord};
use crate::schema::write::{stage_table, StagedOutput};
use crate::snapshot::stage_sqlite_snapshot;

/// The two normalized tables produced from one raw sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// One per source row, ordered by `staging_id` (1..=N).
    pub deals: Vec<Deal>,
    /// Grouped by `staging_id`, panelists before the guest within a group.
    pub investors: Vec<DealInvestor>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_read: usize,
    pub deals_written: usize,
    pub investors_written: usize,
    pub files: Vec<PathBuf>,
}

/// Assign staging ids in input order and build both tables.
///
/// Rows are built in parallel; `collect` on an indexed parallel iterator keeps
/// input order, so the result is the same as a sequential pass.
pub fn normalize(table: &RawTable, roster: &Roster) -> Normalized {
    let per_row: Vec<(Deal, Vec<DealInvestor>)> = table
        .par_iter()
        .enumerate()
        .map(|(i, row)| {
            let staging_id = (i + 1) as StagingId;
            (
                build_deal(staging_id, &row),
                build_investors(staging_id, &row, roster),
            )
        })
        .collect();

    let mut deals = Vec::with_capacity(per_row.len());
    let mut investors = Vec::new();
    for (deal, invs) in per_row {
        debug_assert!(invs.len() <= roster.max_per_deal());
        deals.push(deal);
        investors.extend(invs);
    }

    Normalized { deals, investors }
}

/// Write both tables in every selected format, plus the SQLite snapshot when
/// `sqlite` is set. All files are staged first and committed together, so a
/// failure in any sink leaves every earlier output untouched.
pub fn persist(
    normalized: &Normalized,
    out_dir: &Path,
    formats: &[OutputFormat],
    sqlite: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut staged = StagedOutput::new();
    for &format in formats {
        stage_table(&mut staged, out_dir, format, &normalized.deals)?;
        stage_table(&mut staged, out_dir, format, &normalized.investors)?;
    }
    if let Some(db) = sqlite {
        stage_sqlite_snapshot(&mut staged, db, &normalized.deals, &normalized.investors)?;
    }
    staged.commit()
}

/// Absent-value tally per numeric/date `deals` column, for the debug log.
fn absent_counts(deals: &[Deal]) -> Vec<(&'static str, usize)> {
    let columns = Deal::columns();
    let mut counts = vec![0usize; columns.len()];
    for deal in deals {
        for (i, cell) in deal.cells().iter().enumerate() {
            if cell.is_null() {
                counts[i] += 1;
            }
        }
    }
    columns
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(c, n)| (c.name, n))
        .collect()
}

/// Full ETL run: load the raw sheet, normalize it, write the outputs.
///
/// A missing or unreadable source fails before anything is written.
#[tracing::instrument(level = "info", skip(cfg), fields(input = %cfg.input.display()))]
pub fn run(cfg: &EtlConfig) -> Result<RunSummary> {
    cfg.validate()?;
    let start = Instant::now();

    let table = RawTable::load(&cfg.input)?;
    info!(rows = table.len(), columns = table.headers.len(), "read raw source");
    if table.is_empty() {
        warn!("raw source has a header but no data rows");
    }

    let normalized = normalize(&table, &cfg.roster);
    for (column, n) in absent_counts(&normalized.deals) {
        debug!(column, absent = n, "absent cells");
    }

    let files = persist(
        &normalized,
        &cfg.output_dir,
        &cfg.output_formats(),
        cfg.sqlite.as_deref(),
    )?;

    let summary = RunSummary {
        rows_read: table.len(),
        deals_written: normalized.deals.len(),
        investors_written: normalized.investors.len(),
        files,
    };
    info!(
        rows = summary.rows_read,
        deals = summary.deals_written,
        deal_investors = summary.investors_written,
        files = summary.files.len(),
        elapsed = ?start.elapsed(),
        "ETL run complete"
    );
    Ok(summary)
}
