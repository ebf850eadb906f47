// src/process/deal.rs

use chrono::NaiveDate;
use serde::Serialize;

use crate::process::date_parser::parse_date;
use crate::process::parsed::Parsed;
use crate::process::parsers::{
    parse_amount, parse_bool, parse_float_or_nan, parse_int, parse_percent,
};
use crate::process::raw_table::RawRow;
use crate::schema::types::{Cell, ColumnKind, ColumnSpec, TableRecord};

use ColumnKind::{Date, Flag, Float, Int, Text};

/// Row number in the source sheet, 1-based, dense.
pub type StagingId = i64;

/// One pitch. Field order is the column order of the `deals` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub staging_id: StagingId,
    pub company: String,
    pub season: Parsed<String>,
    pub episode_number: Parsed<i64>,
    pub pitch_number: Parsed<i64>,
    pub season_start: Parsed<NaiveDate>,
    pub season_end: Parsed<NaiveDate>,
    pub original_air_date: Parsed<NaiveDate>,
    pub episode_title: String,
    pub anchor: String,
    pub sector: String,
    pub business_description: String,
    pub company_website: String,
    pub started_in: String,
    pub founder_count: Parsed<i64>,
    pub male_presenters: Parsed<i64>,
    pub female_presenters: Parsed<i64>,
    pub transgender_presenters: Parsed<i64>,
    pub couple_presenters: u8,
    pub pitchers_average_age: Parsed<f64>,
    pub pitchers_city: String,
    pub pitchers_state: String,
    pub yearly_revenue: Parsed<f64>,
    pub monthly_sales: Parsed<f64>,
    pub gross_margin: Parsed<f64>,
    pub net_margin: Parsed<f64>,
    pub ebitda: Parsed<f64>,
    pub cash_burn: Parsed<f64>,
    pub skus: Parsed<i64>,
    pub has_patents: u8,
    pub bootstrapped: u8,
    pub part_of_match_off: u8,
    pub asked_amount: Parsed<f64>,
    pub equity_asked: Parsed<f64>,
    pub valuation_requested: Parsed<f64>,
    pub received_offer: String,
    pub accepted_offer: String,
    pub invested_amount: Parsed<f64>,
    pub equity_final: Parsed<f64>,
    pub total_deal_debt: Parsed<f64>,
    pub deal_valuation: Parsed<f64>,
    pub number_of_sharks_in_deal: Parsed<i64>,
    pub deal_has_conditions: u8,
    pub royalty_percentage: Parsed<f64>,
    pub royalty_recouped_amount: Parsed<f64>,
    pub advisory_shares_equity: Parsed<f64>,
    pub namita_present: u8,
    pub vineeta_present: u8,
    pub anupam_present: u8,
    pub aman_present: u8,
    pub peyush_present: u8,
    pub ritesh_present: u8,
    pub amit_present: u8,
    pub guest_present: u8,
}

/// `"Season " + n`, or absent when the season cell is blank.
pub fn season_label(raw: &str) -> Parsed<String> {
    let n = raw.trim();
    if n.is_empty() {
        Parsed::Absent
    } else {
        Parsed::Present(format!("Season {}", n))
    }
}

/// Map one source row to its `Deal`. Infallible: a cell that does not parse
/// leaves only its own field absent.
pub fn build_deal(staging_id: StagingId, row: &RawRow<'_>) -> Deal {
    let text = |col: &str| row.get(col).to_string();
    let int = |col: &str| parse_int(row.get(col));
    let amount = |col: &str| parse_amount(row.get(col));
    let percent = |col: &str| parse_percent(row.get(col));
    let date = |col: &str| parse_date(row.get(col));
    let flag = |col: &str| parse_bool(row.get(col));

    Deal {
        staging_id,
        company: text("Startup Name"),
        season: season_label(row.get("Season Number")),
        episode_number: int("Episode Number"),
        pitch_number: int("Pitch Number"),
        season_start: date("Season Start"),
        season_end: date("Season End"),
        original_air_date: date("Original Air Date"),
        episode_title: text("Episode Title"),
        anchor: text("Anchor"),
        sector: text("Industry"),
        business_description: text("Business Description"),
        company_website: text("Company Website"),
        started_in: text("Started in"),
        founder_count: int("Number of Presenters"),
        male_presenters: int("Male Presenters"),
        female_presenters: int("Female Presenters"),
        transgender_presenters: int("Transgender Presenters"),
        couple_presenters: flag("Couple Presenters"),
        pitchers_average_age: parse_float_or_nan(row.get("Pitchers Average Age")),
        pitchers_city: text("Pitchers City"),
        pitchers_state: text("Pitchers State"),
        yearly_revenue: amount("Yearly Revenue"),
        monthly_sales: amount("Monthly Sales"),
        gross_margin: percent("Gross Margin"),
        net_margin: percent("Net Margin"),
        ebitda: amount("EBITDA"),
        cash_burn: amount("Cash Burn"),
        skus: int("SKUs"),
        has_patents: flag("Has Patents"),
        bootstrapped: flag("Bootstrapped"),
        part_of_match_off: flag("Part of Match off"),
        asked_amount: amount("Original Ask Amount"),
        equity_asked: percent("Original Offered Equity"),
        valuation_requested: amount("Valuation Requested"),
        received_offer: text("Received Offer"),
        accepted_offer: text("Accepted Offer"),
        invested_amount: amount("Total Deal Amount"),
        equity_final: percent("Total Deal Equity"),
        total_deal_debt: amount("Total Deal Debt"),
        deal_valuation: amount("Deal Valuation"),
        number_of_sharks_in_deal: int("Number of Sharks in Deal"),
        deal_has_conditions: flag("Deal Has Conditions"),
        royalty_percentage: percent("Royalty Percentage"),
        royalty_recouped_amount: amount("Royalty Recouped Amount"),
        advisory_shares_equity: percent("Advisory Shares Equity"),
        namita_present: flag("Namita Present"),
        vineeta_present: flag("Vineeta Present"),
        anupam_present: flag("Anupam Present"),
        aman_present: flag("Aman Present"),
        peyush_present: flag("Peyush Present"),
        ritesh_present: flag("Ritesh Present"),
        amit_present: flag("Amit Present"),
        guest_present: flag("Guest Present"),
    }
}

static DEAL_COLUMNS: [ColumnSpec; 54] = [
    ColumnSpec::required("staging_id", Int),
    ColumnSpec::new("company", Text),
    ColumnSpec::new("season", Text),
    ColumnSpec::new("episode_number", Int),
    ColumnSpec::new("pitch_number", Int),
    ColumnSpec::new("season_start", Date),
    ColumnSpec::new("season_end", Date),
    ColumnSpec::new("original_air_date", Date),
    ColumnSpec::new("episode_title", Text),
    ColumnSpec::new("anchor", Text),
    ColumnSpec::new("sector", Text),
    ColumnSpec::new("business_description", Text),
    ColumnSpec::new("company_website", Text),
    ColumnSpec::new("started_in", Text),
    ColumnSpec::new("founder_count", Int),
    ColumnSpec::new("male_presenters", Int),
    ColumnSpec::new("female_presenters", Int),
    ColumnSpec::new("transgender_presenters", Int),
    ColumnSpec::new("couple_presenters", Flag),
    ColumnSpec::new("pitchers_average_age", Float),
    ColumnSpec::new("pitchers_city", Text),
    ColumnSpec::new("pitchers_state", Text),
    ColumnSpec::new("yearly_revenue", Float),
    ColumnSpec::new("monthly_sales", Float),
    ColumnSpec::new("gross_margin", Float),
    ColumnSpec::new("net_margin", Float),
    ColumnSpec::new("ebitda", Float),
    ColumnSpec::new("cash_burn", Float),
    ColumnSpec::new("skus", Int),
    ColumnSpec::new("has_patents", Flag),
    ColumnSpec::new("bootstrapped", Flag),
    ColumnSpec::new("part_of_match_off", Flag),
    ColumnSpec::new("asked_amount", Float),
    ColumnSpec::new("equity_asked", Float),
    ColumnSpec::new("valuation_requested", Float),
    ColumnSpec::new("received_offer", Text),
    ColumnSpec::new("accepted_offer", Text),
    ColumnSpec::new("invested_amount", Float),
    ColumnSpec::new("equity_final", Float),
    ColumnSpec::new("total_deal_debt", Float),
    ColumnSpec::new("deal_valuation", Float),
    ColumnSpec::new("number_of_sharks_in_deal", Int),
    ColumnSpec::new("deal_has_conditions", Flag),
    ColumnSpec::new("royalty_percentage", Float),
    ColumnSpec::new("royalty_recouped_amount", Float),
    ColumnSpec::new("advisory_shares_equity", Float),
    ColumnSpec::new("namita_present", Flag),
    ColumnSpec::new("vineeta_present", Flag),
    ColumnSpec::new("anupam_present", Flag),
    ColumnSpec::new("aman_present", Flag),
    ColumnSpec::new("peyush_present", Flag),
    ColumnSpec::new("ritesh_present", Flag),
    ColumnSpec::new("amit_present", Flag),
    ColumnSpec::new("guest_present", Flag),
];

impl TableRecord for Deal {
    const TABLE: &'static str = "deals";

    fn columns() -> &'static [ColumnSpec] {
        &DEAL_COLUMNS
    }

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Int(Some(self.staging_id)),
            Cell::text(&self.company),
            Cell::Text(self.season.as_ref().map(String::as_str).into()),
            Cell::int(self.episode_number),
            Cell::int(self.pitch_number),
            Cell::date(self.season_start),
            Cell::date(self.season_end),
            Cell::date(self.original_air_date),
            Cell::text(&self.episode_title),
            Cell::text(&self.anchor),
            Cell::text(&self.sector),
            Cell::text(&self.business_description),
            Cell::text(&self.company_website),
            Cell::text(&self.started_in),
            Cell::int(self.founder_count),
            Cell::int(self.male_presenters),
            Cell::int(self.female_presenters),
            Cell::int(self.transgender_presenters),
            Cell::Flag(self.couple_presenters),
            Cell::float(self.pitchers_average_age),
            Cell::text(&self.pitchers_city),
            Cell::text(&self.pitchers_state),
            Cell::float(self.yearly_revenue),
            Cell::float(self.monthly_sales),
            Cell::float(self.gross_margin),
            Cell::float(self.net_margin),
            Cell::float(self.ebitda),
            Cell::float(self.cash_burn),
            Cell::int(self.skus),
            Cell::Flag(self.has_patents),
            Cell::Flag(self.bootstrapped),
            Cell::Flag(self.part_of_match_off),
            Cell::float(self.asked_amount),
            Cell::float(self.equity_asked),
            Cell::float(self.valuation_requested),
            Cell::text(&self.received_offer),
            Cell::text(&self.accepted_offer),
            Cell::float(self.invested_amount),
            Cell::float(self.equity_final),
            Cell::float(self.total_deal_debt),
            Cell::float(self.deal_valuation),
            Cell::int(self.number_of_sharks_in_deal),
            Cell::Flag(self.deal_has_conditions),
            Cell::float(self.royalty_percentage),
            Cell::float(self.royalty_recouped_amount),
            Cell::float(self.advisory_shares_equity),
            Cell::Flag(self.namita_present),
            Cell::Flag(self.vineeta_present),
            Cell::Flag(self.anupam_present),
            Cell::Flag(self.aman_present),
            Cell::Flag(self.peyush_present),
            Cell::Flag(self.ritesh_present),
            Cell::Flag(self.amit_present),
            Cell::Flag(self.guest_present),
        ]
    }
}
