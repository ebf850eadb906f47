// src/process/investors.rs

use serde::{Deserialize, Serialize};

use crate::process::deal::StagingId;
use crate::process::parsed::Parsed;
use crate::process::parsers::{parse_amount, parse_percent};
use crate::process::raw_table::RawRow;
use crate::schema::types::{Cell, ColumnKind, ColumnSpec, TableRecord};

/// Panelists in the order their rows are emitted.
pub const DEFAULT_PANELISTS: [&str; 7] = [
    "Namita", "Vineeta", "Anupam", "Aman", "Peyush", "Ritesh", "Amit",
];

pub const GUEST_NAME_COLUMN: &str = "Invested Guest Name";
pub const GUEST_FALLBACK_NAME: &str = "Guest";

/// At most this many investor rows per pitch with the default roster.
pub const MAX_INVESTORS_PER_DEAL: usize = DEFAULT_PANELISTS.len() + 1;

/// One investor's share of one pitch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealInvestor {
    pub staging_id: StagingId,
    pub investor: String,
    pub invested_amount: Parsed<f64>,
    pub invested_equity: Parsed<f64>,
    pub invested_debt: Parsed<f64>,
}

/// The ordered list of named panelists to fan out per pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    names: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(DEFAULT_PANELISTS)
    }
}

impl Roster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Upper bound on investor rows one pitch can produce (panelists + guest).
    pub fn max_per_deal(&self) -> usize {
        self.names.len() + 1
    }
}

/// Raw column names holding one participant's amount, equity and debt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorColumns {
    pub amount: String,
    pub equity: String,
    pub debt: String,
}

impl InvestorColumns {
    /// `"<Name> Investment Amount"`, `"<Name> Investment Equity"`, `"<Name> Debt Amount"`.
    pub fn for_name(name: &str) -> Self {
        Self {
            amount: format!("{} Investment Amount", name),
            equity: format!("{} Investment Equity", name),
            debt: format!("{} Debt Amount", name),
        }
    }

    pub fn guest() -> Self {
        Self::for_name("Guest")
    }
}

/// Parsed (amount, equity, debt), or `None` when all three are absent.
fn read_stake(row: &RawRow<'_>, cols: &InvestorColumns) -> Option<[Parsed<f64>; 3]> {
    let amount = parse_amount(row.get(&cols.amount));
    let equity = parse_percent(row.get(&cols.equity));
    let debt = parse_amount(row.get(&cols.debt));
    if amount.is_absent() && equity.is_absent() && debt.is_absent() {
        None
    } else {
        Some([amount, equity, debt])
    }
}

/// Investor rows for one pitch: roster panelists in roster order, then the
/// guest. A participant with no readable amount, equity or debt is skipped.
pub fn build_investors(
    staging_id: StagingId,
    row: &RawRow<'_>,
    roster: &Roster,
) -> Vec<DealInvestor> {
    let mut out = Vec::new();

    for name in roster.names() {
        if let Some([amount, equity, debt]) = read_stake(row, &InvestorColumns::for_name(name)) {
            out.push(DealInvestor {
                staging_id,
                investor: name.clone(),
                invested_amount: amount,
                invested_equity: equity,
                invested_debt: debt,
            });
        }
    }

    if let Some([amount, equity, debt]) = read_stake(row, &InvestorColumns::guest()) {
        let guest = row.get(GUEST_NAME_COLUMN).trim();
        let investor = if guest.is_empty() {
            GUEST_FALLBACK_NAME.to_string()
        } else {
            guest.to_string()
        };
        out.push(DealInvestor {
            staging_id,
            investor,
            invested_amount: amount,
            invested_equity: equity,
            invested_debt: debt,
        });
    }

    out
}

static INVESTOR_COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::required("staging_id", ColumnKind::Int),
    ColumnSpec::required("investor", ColumnKind::Text),
    ColumnSpec::new("invested_amount", ColumnKind::Float),
    ColumnSpec::new("invested_equity", ColumnKind::Float),
    ColumnSpec::new("invested_debt", ColumnKind::Float),
];

impl TableRecord for DealInvestor {
    const TABLE: &'static str = "deal_investors";

    fn columns() -> &'static [ColumnSpec] {
        &INVESTOR_COLUMNS
    }

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Int(Some(self.staging_id)),
            Cell::text(&self.investor),
            Cell::float(self.invested_amount),
            Cell::float(self.invested_equity),
            Cell::float(self.invested_debt),
        ]
    }
}
