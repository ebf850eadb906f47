use anyhow::Result;
use clap::Parser;
use sharktank_etl::{
    config::EtlConfig,
    logging::init_logging,
    process::{self, investors::Roster},
    schema::OutputFormat,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sharktank_etl")]
#[command(about = "Normalize the raw Shark Tank India sheet into deals and deal_investors tables")]
struct Args {
    /// YAML config file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw CSV export to read
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory receiving the cleaned tables
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format (repeat for several)
    #[arg(short, long = "format", value_enum)]
    formats: Vec<OutputFormat>,

    /// Also write a SQLite snapshot to this path
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// Panelist roster in column order (repeat for several)
    #[arg(long = "roster")]
    roster: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<EtlConfig> {
        let mut cfg = match &self.config {
            Some(path) => EtlConfig::load(path)?,
            None => EtlConfig::default(),
        };
        if let Some(input) = self.input {
            cfg.input = input;
        }
        if let Some(dir) = self.output_dir {
            cfg.output_dir = dir;
        }
        if !self.formats.is_empty() {
            cfg.formats = self.formats;
        }
        if self.sqlite.is_some() {
            cfg.sqlite = self.sqlite;
        }
        if !self.roster.is_empty() {
            cfg.roster = Roster::new(self.roster);
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = args.into_config()?;
    info!(
        input = %cfg.input.display(),
        output_dir = %cfg.output_dir.display(),
        formats = ?cfg.output_formats(),
        panelists = cfg.roster.len(),
        "startup"
    );

    match process::run(&cfg) {
        Ok(summary) => {
            for file in &summary.files {
                info!(path = %file.display(), "output");
            }
            println!(
                "rows read: {}, deals: {}, deal_investors: {}",
                summary.rows_read, summary.deals_written, summary.investors_written
            );
            Ok(())
        }
        Err(e) => {
            error!("ETL run failed: {:#}", e);
            Err(e)
        }
    }
}
