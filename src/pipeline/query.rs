// src/pipeline/query.rs

//! Keyword query pipeline.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::PaperRecord;
use crate::services::FuzzySearch;
use crate::storage::{PaperStore, SqliteStore};

/// Split a comma-separated keyword list, dropping blank pieces.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Open a database that must already have been built.
pub fn open_existing(path: &Path) -> Result<SqliteStore> {
    if !path.exists() {
        return Err(AppError::MissingDatabase(path.display().to_string()));
    }
    SqliteStore::open(path)
}

/// Search `store` for `keywords` and return ranked hits.
pub fn run_query(
    store: &dyn PaperStore,
    keywords: &[String],
    search_abstract: bool,
) -> Result<Vec<PaperRecord>> {
    if keywords.is_empty() {
        log::warn!("No keyword is provided. Return all the papers.");
    } else {
        log::info!(
            "Grep based on the following keywords: {}",
            keywords.join(", ")
        );
    }

    let papers = FuzzySearch::new().search(store, keywords, search_abstract)?;
    log::debug!("Found {} papers", papers.len());
    Ok(papers)
}
