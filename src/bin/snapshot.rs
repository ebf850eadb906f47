use anyhow::Result;
use clap::Parser;
use sharktank_etl::{config::DEFAULT_OUTPUT_DIR, logging::init_logging, snapshot::snapshot_from_csv};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "snapshot")]
#[command(about = "Build a SQLite database from the cleaned deals and deal_investors CSVs")]
struct Args {
    /// Directory holding deals_clean.csv and deal_investors_clean.csv
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    dir: PathBuf,

    /// Database file to (re)create
    #[arg(short, long, default_value = "data/sharktank.db")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let path = snapshot_from_csv(&args.dir, &args.output)?;
    info!(path = %path.display(), "snapshot ready");
    Ok(())
}
