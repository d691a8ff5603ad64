// src/models/mod.rs

//! Domain models for the paper database.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod conference;
mod config;
mod paper;

// Re-export all public types
pub use conference::Conference;
pub use config::{
    AggregatorConfig, Config, CrawlerConfig, DatabaseConfig, FIRST_YEAR, RenderConfig,
};
pub use paper::{BibEntry, ConferenceYear, PaperKey, PaperRecord};
