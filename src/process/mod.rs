pub mod date_parser;
pub mod deal;
pub mod investors;
pub mod parsed;
pub mod parsers;
pub mod pipeline;
pub mod raw_table;
pub mod utils;

pub use deal::{build_deal, Deal, StagingId};
pub use investors::{build_investors, DealInvestor, Roster};
pub use parsed::Parsed;
pub use pipeline::{normalize, persist, run, Normalized, RunSummary};
pub use raw_table::{RawRow, RawTable};
