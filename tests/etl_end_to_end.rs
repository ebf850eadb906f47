use anyhow::Result;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rusqlite::Connection;
use sharktank_etl::{
    config::EtlConfig,
    process::{self, investors::MAX_INVESTORS_PER_DEAL, RawTable},
    schema::OutputFormat,
};
use std::{
    fs::{self, File},
    path::Path,
};
use tempfile::tempdir;

const RAW: &str = "\
\u{feff}Season Number,Startup Name,Episode Number,Original Air Date,Yearly Revenue,Gross Margin,Has Patents,Namita Present,Namita Investment Amount,Namita Investment Equity,Namita Debt Amount,Aman Investment Amount,Aman Investment Equity,Invested Guest Name,Guest Investment Amount,Guest Debt Amount
1,BluePine Foods,1,20-Dec-2021,\"₹1,50,00,000\",40%,yes,1,50 lakh,5%,,25 lakh,2.5,,,
1,Garbage Co,abc,not a date,lots,n/a,maybe,,???,,,,,,,
2,  Skippi Ice Pops  ,3,2023-01-02,95 lakhs,,no,0,,,,,,Ritesh,10 lakh,1 crore
";

fn write_raw(dir: &Path) -> Result<std::path::PathBuf> {
    let path = dir.join("raw.csv");
    fs::write(&path, RAW)?;
    Ok(path)
}

fn config(dir: &Path) -> Result<EtlConfig> {
    Ok(EtlConfig {
        input: write_raw(dir)?,
        output_dir: dir.join("out"),
        ..EtlConfig::default()
    })
}

fn parquet_rows(path: &Path) -> Result<usize> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?;
    let mut n = 0;
    for batch in reader {
        n += batch?.num_rows();
    }
    Ok(n)
}

#[test]
fn run_writes_both_tables_in_every_format() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config(dir.path())?;
    let summary = process::run(&cfg)?;

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.deals_written, 3);
    assert_eq!(summary.investors_written, 3);
    assert_eq!(summary.files.len(), 4);

    let out = &cfg.output_dir;
    for name in [
        "deals_clean.csv",
        "deal_investors_clean.csv",
        "deals.parquet",
        "deal_investors.parquet",
    ] {
        assert!(out.join(name).is_file(), "missing {}", name);
    }
    assert_eq!(parquet_rows(&out.join("deals.parquet"))?, 3);
    assert_eq!(parquet_rows(&out.join("deal_investors.parquet"))?, 3);

    // no temp files left behind
    let leftovers: Vec<_> = fs::read_dir(out)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

#[test]
fn staging_ids_are_dense_and_investors_bounded() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config(dir.path())?;
    let table = RawTable::load(&cfg.input)?;
    let normalized = process::normalize(&table, &cfg.roster);

    let ids: Vec<i64> = normalized.deals.iter().map(|d| d.staging_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(normalized.investors.len() <= MAX_INVESTORS_PER_DEAL * normalized.deals.len());
    for inv in &normalized.investors {
        assert!(ids.contains(&inv.staging_id));
    }
    Ok(())
}

#[test]
fn rows_parse_into_typed_fields() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config(dir.path())?;
    let table = RawTable::load(&cfg.input)?;
    let n = process::normalize(&table, &cfg.roster);

    let first = &n.deals[0];
    assert_eq!(first.company, "BluePine Foods");
    assert_eq!(first.season.as_ref().into_option().map(String::as_str), Some("Season 1"));
    assert_eq!(first.yearly_revenue.into_option(), Some(15_000_000.0));
    assert_eq!(first.gross_margin.into_option(), Some(40.0));
    assert_eq!(first.has_patents, 1);
    assert_eq!(first.namita_present, 1);
    assert_eq!(
        first.original_air_date.into_option().map(|d| d.to_string()),
        Some("2021-12-20".to_string())
    );

    // a row of garbage still yields a deal, with its fields absent
    let garbage = &n.deals[1];
    assert_eq!(garbage.company, "Garbage Co");
    assert!(garbage.episode_number.is_absent());
    assert!(garbage.original_air_date.is_absent());
    assert!(garbage.yearly_revenue.is_absent());
    assert!(garbage.gross_margin.is_absent());
    assert_eq!(garbage.has_patents, 0);
    assert!(!n.investors.iter().any(|i| i.staging_id == 2));

    // text is passed through as-is
    assert_eq!(n.deals[2].company, "  Skippi Ice Pops  ");
    assert_eq!(n.deals[2].yearly_revenue.into_option(), Some(9_500_000.0));
    Ok(())
}

#[test]
fn investors_follow_roster_then_guest() -> Result<()> {
    let dir = tempdir()?;
    let cfg = config(dir.path())?;
    let table = RawTable::load(&cfg.input)?;
    let n = process::normalize(&table, &cfg.roster);

    let got: Vec<(i64, &str)> = n
        .investors
        .iter()
        .map(|i| (i.staging_id, i.investor.as_str()))
        .collect();
    assert_eq!(got, vec![(1, "Namita"), (1, "Aman"), (3, "Ritesh")]);

    assert_eq!(n.investors[0].invested_amount.into_option(), Some(5_000_000.0));
    assert_eq!(n.investors[0].invested_equity.into_option(), Some(5.0));
    assert!(n.investors[0].invested_debt.is_absent());
    assert_eq!(n.investors[1].invested_equity.into_option(), Some(2.5));
    assert_eq!(n.investors[2].invested_debt.into_option(), Some(10_000_000.0));
    Ok(())
}

#[test]
fn reruns_are_byte_identical() -> Result<()> {
    let dir = tempdir()?;
    let cfg = EtlConfig {
        formats: vec![OutputFormat::Csv],
        ..config(dir.path())?
    };

    process::run(&cfg)?;
    let deals = fs::read(cfg.output_dir.join("deals_clean.csv"))?;
    let investors = fs::read(cfg.output_dir.join("deal_investors_clean.csv"))?;

    process::run(&cfg)?;
    assert_eq!(fs::read(cfg.output_dir.join("deals_clean.csv"))?, deals);
    assert_eq!(fs::read(cfg.output_dir.join("deal_investors_clean.csv"))?, investors);
    Ok(())
}

#[test]
fn csv_output_has_header_and_empty_absent_cells() -> Result<()> {
    let dir = tempdir()?;
    let cfg = EtlConfig {
        formats: vec![OutputFormat::Csv],
        ..config(dir.path())?
    };
    process::run(&cfg)?;

    let text = fs::read_to_string(cfg.output_dir.join("deal_investors_clean.csv"))?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "staging_id,investor,invested_amount,invested_equity,invested_debt",
            "1,Namita,5000000.0,5.0,",
            "1,Aman,2500000.0,2.5,",
            "3,Ritesh,1000000.0,,10000000.0",
        ]
    );

    let deals = fs::read_to_string(cfg.output_dir.join("deals_clean.csv"))?;
    assert!(deals.starts_with("staging_id,company,season,"));
    assert_eq!(deals.lines().count(), 4);
    Ok(())
}

#[test]
fn missing_input_fails_without_touching_outputs() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("out");
    fs::create_dir_all(&out)?;
    fs::write(out.join("deals_clean.csv"), "previous")?;

    let cfg = EtlConfig {
        input: dir.path().join("nope.csv"),
        output_dir: out.clone(),
        ..EtlConfig::default()
    };
    assert!(process::run(&cfg).is_err());

    assert_eq!(fs::read_to_string(out.join("deals_clean.csv"))?, "previous");
    assert!(!out.join("deal_investors_clean.csv").exists());
    assert!(!out.join("deals.parquet").exists());
    Ok(())
}

#[test]
fn sqlite_snapshot_matches_tables() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("out").join("sharktank.db");
    let cfg = EtlConfig {
        formats: vec![OutputFormat::Csv],
        sqlite: Some(db.clone()),
        ..config(dir.path())?
    };
    let summary = process::run(&cfg)?;
    assert!(summary.files.contains(&db));

    let conn = Connection::open(&db)?;
    let deals: i64 = conn.query_row("SELECT COUNT(*) FROM deals", [], |r| r.get(0))?;
    let investors: i64 = conn.query_row("SELECT COUNT(*) FROM deal_investors", [], |r| r.get(0))?;
    assert_eq!((deals, investors), (3, 3));

    let air_date: Option<String> = conn.query_row(
        "SELECT original_air_date FROM deals WHERE staging_id = 1",
        [],
        |r| r.get(0),
    )?;
    assert_eq!(air_date.as_deref(), Some("2021-12-20"));
    Ok(())
}

#[test]
fn failed_snapshot_leaves_earlier_outputs_untouched() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("out");
    fs::create_dir_all(&out)?;
    fs::write(out.join("deals_clean.csv"), "previous")?;

    // a non-empty directory where the database should go
    let db = dir.path().join("dbdir");
    fs::create_dir_all(&db)?;
    fs::write(db.join("keep"), "x")?;

    let cfg = EtlConfig {
        formats: vec![OutputFormat::Csv],
        sqlite: Some(db.clone()),
        ..config(dir.path())?
    };
    assert!(process::run(&cfg).is_err());

    assert_eq!(fs::read_to_string(out.join("deals_clean.csv"))?, "previous");
    assert!(!out.join("deal_investors_clean.csv").exists());
    assert!(db.join("keep").is_file());
    let leftovers: Vec<_> = fs::read_dir(&out)?
        .chain(fs::read_dir(dir.path())?)
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            name.ends_with(".tmp") || name.ends_with(".bak")
        })
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}
