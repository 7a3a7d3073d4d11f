//! AreaPod Roster Service
//!
//! Provides the desired-state side of team reconciliation:
//! - Bounded-retry retrieval of the area-owners document
//! - Parsing of the pipe-delimited area-owners table
//! - Area selection by lead and include/exclude label filters

pub mod fetcher;
pub mod filter;
pub mod parser;

use thiserror::Error;

pub use fetcher::{FetchOutcome, RetryPolicy, RosterFetcher};
pub use filter::AreaFilter;
pub use parser::{parse_area_owners, try_parse_area_label, AreaEntry, AREA_PREFIX};

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Roster configuration error: {0}")]
    Configuration(String),
}
