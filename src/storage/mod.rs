//! Storage abstractions for paper persistence.
//!
//! The harvester and the search engine only talk to [`PaperStore`]; the
//! SQLite backend in [`sqlite`] is the only implementation.
//!
//! ## Operations
//!
//! ```text
//! save(record)                         insert one immutable record
//! exists(conference, year, title, abs) identity-key lookup
//! query(filter)                        substring-filtered listing
//! ```

pub mod sqlite;

use crate::error::Result;
use crate::models::{PaperKey, PaperRecord};

// Re-export for convenience
pub use sqlite::SqliteStore;

/// Column a [`PaperFilter`] matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Abstract,
}

/// Conjunctive substring filter.
///
/// A record matches when the selected field contains every needle. An empty
/// needle list matches every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperFilter {
    pub field: SearchField,
    pub contains: Vec<String>,
}

impl PaperFilter {
    /// Filter on titles.
    pub fn title_contains(needles: &[String]) -> Self {
        Self {
            field: SearchField::Title,
            contains: needles.to_vec(),
        }
    }

    /// Filter on abstracts.
    pub fn abstract_contains(needles: &[String]) -> Self {
        Self {
            field: SearchField::Abstract,
            contains: needles.to_vec(),
        }
    }

    /// Filter that matches every record.
    pub fn all() -> Self {
        Self::title_contains(&[])
    }
}

/// Trait for paper storage backends.
///
/// Records are immutable once saved; there is no update or delete path.
pub trait PaperStore: Send + Sync {
    /// Insert a record.
    fn save(&self, paper: &PaperRecord) -> Result<()>;

    /// Whether a record with this identity key is already stored.
    fn exists(&self, key: PaperKey<'_>) -> Result<bool>;

    /// Records matching `filter`, in insertion order.
    fn query(&self, filter: &PaperFilter) -> Result<Vec<PaperRecord>>;

    /// Number of stored records.
    fn count(&self) -> Result<usize>;
}
