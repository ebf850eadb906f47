pub mod config;
pub mod logging;
pub mod process;
pub mod schema;
pub mod snapshot;
