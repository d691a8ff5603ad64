//! Paper records and the transient bibliography entries they are built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Conference;

/// A paper stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaperRecord {
    /// Venue the paper appeared at
    pub conference: Conference,

    /// Publication year
    pub year: i32,

    /// Title exactly as listed by the aggregator
    pub title: String,

    /// Authors in byline order
    pub authors: Vec<String>,

    /// Abstract text; empty when it was not extracted
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl PaperRecord {
    /// Build a record from a harvested bibliography entry.
    pub fn from_entry(
        conference: Conference,
        year: i32,
        entry: &BibEntry,
        abstract_text: String,
    ) -> Self {
        Self {
            conference,
            year,
            title: entry.title.clone(),
            authors: entry.authors.clone(),
            abstract_text,
        }
    }

    /// Identity key used for deduplication.
    ///
    /// The abstract is part of the key, so a title saved once without and
    /// once with an abstract yields two rows.
    pub fn key(&self) -> PaperKey<'_> {
        PaperKey {
            conference: self.conference,
            year: self.year,
            title: &self.title,
            abstract_text: &self.abstract_text,
        }
    }
}

impl fmt::Display for PaperRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.year, self.title)
    }
}

/// Borrowed identity key of a [`PaperRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperKey<'a> {
    pub conference: Conference,
    pub year: i32,
    pub title: &'a str,
    pub abstract_text: &'a str,
}

/// One paper as listed on an aggregator page.
///
/// Consumed immediately by the harvester; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BibEntry {
    pub title: String,
    pub authors: Vec<String>,
    /// "Electronic edition" link pointing at the publisher page
    pub publisher_link: Option<String>,
}

/// Unit of harvesting: one conference in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConferenceYear {
    pub conference: Conference,
    pub year: i32,
}

impl fmt::Display for ConferenceYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.conference, self.year)
    }
}
