use anyhow::{Context, Result};
use parquet::{
    arrow::ArrowWriter,
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::arrow::to_record_batch;
use super::types::{OutputFormat, TableRecord};

/// A set of output files written to hidden temp paths first and moved into
/// place together by [`StagedOutput::commit`]. Dropping an uncommitted set
/// removes the temp files, leaving earlier outputs untouched.
#[derive(Debug, Default)]
pub struct StagedOutput {
    staged: Vec<(PathBuf, PathBuf)>,
}

/// `<dir>/.<file>.<suffix>` next to `dest`.
fn hidden_sibling(dest: &Path, suffix: &str) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    dest.with_file_name(format!(".{}.{}", name, suffix))
}

/// Move `tmp` over `dest`, parking any previous `dest` at a backup path.
/// Returns the backup path, if one was made.
fn swap_in(tmp: &Path, dest: &Path) -> Result<Option<PathBuf>> {
    let backup = if dest.exists() {
        let bak = hidden_sibling(dest, "bak");
        fs::rename(dest, &bak)
            .with_context(|| format!("backing up {:?} -> {:?}", dest, bak))?;
        Some(bak)
    } else {
        None
    };

    if let Err(e) = fs::rename(tmp, dest) {
        if let Some(bak) = &backup {
            if let Err(e) = fs::rename(bak, dest) {
                warn!(path = %dest.display(), "failed to restore previous output: {}", e);
            }
        }
        return Err(e).with_context(|| format!("renaming {:?} -> {:?}", tmp, dest));
    }
    Ok(backup)
}

/// Put back what `swap_in` replaced, newest first.
fn roll_back(swapped: &[(PathBuf, Option<PathBuf>)]) {
    for (dest, backup) in swapped.iter().rev() {
        let restored = match backup {
            Some(bak) => fs::rename(bak, dest),
            None => fs::remove_file(dest),
        };
        if let Err(e) = restored {
            warn!(path = %dest.display(), "failed to roll back output: {}", e);
        }
    }
}

impl StagedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a temp path next to `dest`: `<dir>/.<file>.tmp`.
    pub fn stage(&mut self, dest: &Path) -> PathBuf {
        let tmp = hidden_sibling(dest, "tmp");
        self.staged.push((tmp.clone(), dest.to_path_buf()));
        tmp
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every temp file over its destination, in staging order.
    ///
    /// Previous destinations are kept as backups until all renames succeed;
    /// if one fails, the ones already done are rolled back, so the set is
    /// replaced as a whole or not at all.
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        if let Some((_, dest)) = self.staged.iter().find(|(_, dest)| dest.is_dir()) {
            anyhow::bail!("output path {} is a directory", dest.display());
        }

        let mut swapped: Vec<(PathBuf, Option<PathBuf>)> = Vec::with_capacity(self.staged.len());
        for (tmp, dest) in &self.staged {
            match swap_in(tmp, dest) {
                Ok(backup) => swapped.push((dest.clone(), backup)),
                Err(e) => {
                    roll_back(&swapped);
                    return Err(e);
                }
            }
        }

        for (dest, backup) in &swapped {
            if let Some(bak) = backup {
                if let Err(e) = fs::remove_file(bak) {
                    warn!(path = %bak.display(), "failed to remove backup: {}", e);
                }
            }
            debug!(path = %dest.display(), "committed output");
        }
        self.staged.clear();
        Ok(swapped.into_iter().map(|(dest, _)| dest).collect())
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        for (tmp, _) in &self.staged {
            if tmp.exists() {
                if let Err(e) = fs::remove_file(tmp) {
                    warn!(path = %tmp.display(), "failed to remove temp output: {}", e);
                }
            }
        }
    }
}

/// Write `records` as CSV with a header row (written even when empty).
/// Absent values are empty cells. Returns bytes written.
pub fn write_csv<T: TableRecord>(path: &Path, records: &[T]) -> Result<u64> {
    let file = File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    wtr.write_record(T::columns().iter().map(|c| c.name))
        .with_context(|| format!("writing `{}` header", T::TABLE))?;
    for record in records {
        wtr.serialize(record)
            .with_context(|| format!("writing `{}` row", T::TABLE))?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    let metadata = fs::metadata(path).context("getting file metadata")?;
    Ok(metadata.len())
}

/// Write `records` as a single-batch Parquet file. Returns bytes written.
pub fn write_parquet<T: TableRecord>(path: &Path, records: &[T]) -> Result<u64> {
    let batch = to_record_batch(records)?;

    let file = File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_dictionary_enabled(true)
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    let metadata = fs::metadata(path).context("getting file metadata")?;
    Ok(metadata.len())
}

/// Stage one table in `format` under `out_dir`, returning the temp path used.
pub fn stage_table<T: TableRecord>(
    staged: &mut StagedOutput,
    out_dir: &Path,
    format: OutputFormat,
    records: &[T],
) -> Result<PathBuf> {
    let dest = out_dir.join(format.file_name(T::TABLE));
    let tmp = staged.stage(&dest);
    let bytes = match format {
        OutputFormat::Csv => write_csv(&tmp, records)?,
        OutputFormat::Parquet => write_parquet(&tmp, records)?,
    };
    debug!(table = T::TABLE, %format, rows = records.len(), bytes, "staged table");
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::investors::DealInvestor;
    use crate::process::parsed::Parsed;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn sample() -> Vec<DealInvestor> {
        vec![DealInvestor {
            staging_id: 1,
            investor: "Vineeta".into(),
            invested_amount: Parsed::Present(2_500_000.0),
            invested_equity: Parsed::Present(4.0),
            invested_debt: Parsed::Absent,
        }]
    }

    #[test]
    fn csv_writes_header_and_empty_cells() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inv.csv");
        let bytes = write_csv(&path, &sample())?;

        let text = fs::read_to_string(&path)?;
        assert_eq!(bytes, text.len() as u64);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("staging_id,investor,invested_amount,invested_equity,invested_debt")
        );
        assert_eq!(lines.next(), Some("1,Vineeta,2500000.0,4.0,"));
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn csv_header_survives_empty_table() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inv.csv");
        write_csv::<DealInvestor>(&path, &[])?;
        assert_eq!(
            fs::read_to_string(&path)?.trim_end(),
            "staging_id,investor,invested_amount,invested_equity,invested_debt"
        );
        Ok(())
    }

    #[test]
    fn parquet_round_trips_row_count() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("inv.parquet");
        assert!(write_parquet(&path, &sample())? > 0);

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let rows: usize = reader.map(|b| b.map(|b| b.num_rows())).sum::<Result<usize, _>>()?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[test]
    fn uncommitted_stage_is_cleaned_up() -> Result<()> {
        let dir = tempdir()?;
        let dest = dir.path().join("deals_clean.csv");
        fs::write(&dest, "previous run")?;

        let tmp = {
            let mut staged = StagedOutput::new();
            let tmp = staged.stage(&dest);
            fs::write(&tmp, "half written")?;
            tmp
        };

        assert!(!tmp.exists());
        assert_eq!(fs::read_to_string(&dest)?, "previous run");
        Ok(())
    }

    #[test]
    fn commit_replaces_destinations() -> Result<()> {
        let dir = tempdir()?;
        let mut staged = StagedOutput::new();
        let dests: Vec<PathBuf> = ["a.csv", "b.csv"].iter().map(|n| dir.path().join(n)).collect();
        fs::write(&dests[0], "old")?;
        for d in &dests {
            let tmp = staged.stage(d);
            fs::write(tmp, "new")?;
        }
        assert_eq!(staged.len(), 2);

        let done = staged.commit()?;
        assert_eq!(done, dests);
        for d in &dests {
            assert_eq!(fs::read_to_string(d)?, "new");
        }
        Ok(())
    }

    #[test]
    fn failed_commit_restores_earlier_destinations() -> Result<()> {
        let dir = tempdir()?;
        let deals = dir.path().join("deals_clean.csv");
        let investors = dir.path().join("deal_investors_clean.csv");
        fs::write(&deals, "previous deals")?;

        let mut staged = StagedOutput::new();
        fs::write(staged.stage(&deals), "new deals")?;
        // staged but never written, so its rename fails
        let missing = staged.stage(&investors);

        assert!(staged.commit().is_err());
        assert_eq!(fs::read_to_string(&deals)?, "previous deals");
        assert!(!investors.exists());
        assert!(!missing.exists());
        assert!(!hidden_sibling(&deals, "bak").exists());
        assert!(!hidden_sibling(&deals, "tmp").exists());
        Ok(())
    }

    #[test]
    fn commit_refuses_directory_destination() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("deals_clean.csv");
        let db = dir.path().join("sharktank.db");
        fs::create_dir(&db)?;
        fs::write(db.join("keep"), "x")?;

        let mut staged = StagedOutput::new();
        fs::write(staged.stage(&file), "new")?;
        fs::write(staged.stage(&db), "db")?;

        assert!(staged.commit().is_err());
        assert!(!file.exists());
        assert!(db.join("keep").is_file());
        Ok(())
    }
}
