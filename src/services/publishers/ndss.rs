//! NDSS Symposium paper pages.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::{PublisherAdapter, parse_selector, text_after_marker};
use crate::error::{AppError, Result};
use crate::utils::http::fetch_text;

/// Extracts abstracts from `ndss-symposium.org`.
pub struct NdssAdapter {
    client: Client,
}

impl NdssAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Newer pages wrap the paper in `div.paper-data`, mixing the byline and
    /// the abstract paragraphs. Older pages use an `Abstract:` heading.
    fn parse(html: &str, authors: &[String]) -> Result<String> {
        let document = Html::parse_document(html);
        let container_sel = parse_selector("div.paper-data")?;
        let paragraph_sel = parse_selector("p")?;

        if let Some(container) = document.select(&container_sel).next() {
            let first_author = authors.first().map(String::as_str);
            let paragraphs: Vec<String> = container
                .select(&paragraph_sel)
                .map(|p| p.text().collect::<String>())
                .filter(|text| !text.is_empty())
                .filter(|text| first_author.is_none_or(|author| !text.contains(author)))
                .collect();
            return Ok(paragraphs.join("\n"));
        }

        text_after_marker(&document, "Abstract:")
            .ok_or_else(|| AppError::crawl("ndss", "no abstract markup"))
    }
}

#[async_trait]
impl PublisherAdapter for NdssAdapter {
    async fn fetch_abstract(&self, url: &str, authors: &[String]) -> Result<String> {
        log::debug!("URL: {url}");
        let html = fetch_text(&self.client, url).await?;
        Self::parse(&html, authors)
    }
}
