//! Service layer for the paper database.
//!
//! This module contains the business logic for:
//! - Abstract extraction per publisher (`publishers`)
//! - Routing entries to publishers (`AbstractDispatcher`)
//! - Listing harvesting and deduplication (`BibliographyHarvester`)
//! - Keyword search and ranking (`FuzzySearch`)

mod dispatcher;
mod harvester;
pub mod publishers;
mod search;

pub use dispatcher::AbstractDispatcher;
pub use harvester::{BibliographyHarvester, HarvestOutcome};
pub use search::{FuzzySearch, rank};
