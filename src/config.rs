// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::process::investors::Roster;
use crate::schema::types::OutputFormat;

pub const DEFAULT_INPUT: &str = "data/sharktank_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Settings for one ETL run.
///
/// ```yaml
/// input: data/sharktank_data.csv
/// output_dir: data
/// formats: [csv, parquet]
/// sqlite: data/sharktank.db
/// roster: [Namita, Vineeta, Anupam, Aman, Peyush, Ritesh, Amit]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    /// Also write a SQLite snapshot here.
    pub sqlite: Option<PathBuf>,
    pub roster: Roster,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            formats: vec![OutputFormat::Csv, OutputFormat::Parquet],
            sqlite: None,
            roster: Roster::default(),
        }
    }
}

impl EtlConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s).context("parsing YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.formats.is_empty() && self.sqlite.is_none() {
            anyhow::bail!("no outputs selected: set `formats` or `sqlite`");
        }
        if let Some(blank) = self.roster.names().iter().find(|n| n.trim().is_empty()) {
            anyhow::bail!("roster contains a blank panelist name ({:?})", blank);
        }
        Ok(())
    }

    /// Formats in a fixed order with duplicates removed.
    pub fn output_formats(&self) -> Vec<OutputFormat> {
        let mut out = Vec::with_capacity(self.formats.len());
        for f in &self.formats {
            if !out.contains(f) {
                out.push(*f);
            }
        }
        out
    }
}
