//! Per-publisher abstract extraction.
//!
//! Each conference publishes its papers on a different site with its own
//! markup. A [`PublisherAdapter`] knows how to find the publisher page for a
//! bibliography entry and how to pull the abstract out of it. Extraction is
//! best effort: [`PublisherAdapter::extract_abstract`] never fails and
//! returns an empty string when anything goes wrong.

mod ccs;
mod ieee;
mod ndss;
mod usenix;

pub use ccs::CcsAdapter;
pub use ieee::IeeeAdapter;
pub use ndss::NdssAdapter;
pub use usenix::UsenixAdapter;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{AppError, Result};
use crate::models::BibEntry;

/// Strategy for extracting abstracts from one publisher.
#[async_trait]
pub trait PublisherAdapter: Send + Sync {
    /// Locate the publisher page for `entry`.
    fn publisher_url(&self, entry: &BibEntry) -> Result<String> {
        entry
            .publisher_link
            .clone()
            .ok_or_else(|| AppError::crawl(&entry.title, "no electronic edition link"))
    }

    /// Fetch the publisher page at `url` and extract the abstract.
    async fn fetch_abstract(&self, url: &str, authors: &[String]) -> Result<String>;

    /// Best-effort abstract for `entry`; empty on any failure.
    async fn extract_abstract(&self, entry: &BibEntry) -> String {
        let url = match self.publisher_url(entry) {
            Ok(url) => url,
            Err(e) => {
                log::debug!("Failed to obtain publisher URL. Paper: {} ({e})", entry.title);
                return String::new();
            }
        };

        match self.fetch_abstract(&url, &entry.authors).await {
            Ok(text) => text,
            Err(e) => {
                log::debug!("Failed to extract abstract from publisher URL {url}: {e}");
                String::new()
            }
        }
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Text of `element` with each non-blank text chunk trimmed and joined by
/// newlines.
pub(crate) fn joined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text of the first element following the first text node that contains
/// `marker`, in document order.
///
/// Publisher pages of this kind render `<strong>Abstract:</strong>` and put
/// the abstract itself in the next element.
pub(crate) fn text_after_marker(document: &Html, marker: &str) -> Option<String> {
    let mut seen_marker = false;
    for node in document.root_element().descendants() {
        if seen_marker {
            if let Some(element) = ElementRef::wrap(node) {
                return Some(joined_text(element));
            }
        } else if let Node::Text(text) = node.value() {
            seen_marker = text.contains(marker);
        }
    }
    None
}
