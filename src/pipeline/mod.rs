//! Pipeline entry points.
//!
//! - `run_build`: Harvest every conference-year into the database
//! - `run_query`: Search the database for keywords

pub mod build;
pub mod query;

pub use build::{BuildSummary, build_units, harvest_units, run_build};
pub use query::{open_existing, parse_keywords, run_query};
