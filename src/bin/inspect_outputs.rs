use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use sharktank_etl::{
    config::DEFAULT_OUTPUT_DIR,
    process::{Deal, DealInvestor},
    schema::{OutputFormat, TableRecord},
};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "inspect_outputs")]
#[command(about = "Print row counts, schema and leading rows of the Parquet outputs")]
struct Args {
    /// Directory holding deals.parquet and deal_investors.parquet
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    dir: PathBuf,

    /// Rows to show per table
    #[arg(short = 'n', long, default_value_t = 5)]
    rows: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    for table in [Deal::TABLE, DealInvestor::TABLE] {
        let path = args.dir.join(OutputFormat::Parquet.file_name(table));
        inspect(&path, args.rows)?;
    }
    Ok(())
}

fn inspect(path: &Path, limit: usize) -> Result<()> {
    let reader = SerializedFileReader::new(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    )
    .with_context(|| format!("reading parquet footer of {}", path.display()))?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();

    println!("=== {} ===", path.display());
    println!("Total rows:           {}", file_meta.num_rows());
    println!("Number of row groups: {}", meta.num_row_groups());
    println!("File size on disk:    {} bytes", std::fs::metadata(path)?.len());

    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    println!("Columns:");
    for field in builder.schema().fields() {
        let null = if field.is_nullable() { "" } else { " not null" };
        println!("- {:<28} {}{}", field.name(), field.data_type(), null);
    }

    let batches: Vec<RecordBatch> = builder
        .with_limit(limit)
        .build()?
        .collect::<Result<Vec<_>, _>>()
        .context("decoding record batches")?;
    println!("{}", pretty_format_batches(&batches)?);
    println!();
    Ok(())
}
