pub mod arrow;
pub mod types;
pub mod write;

pub use arrow::{build_arrow_schema, map_to_arrow_type, to_record_batch};
pub use types::{Cell, ColumnKind, ColumnSpec, OutputFormat, TableRecord};
pub use write::{stage_table, write_csv, write_parquet, StagedOutput};
