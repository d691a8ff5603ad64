//! USENIX Security presentation pages.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::{PublisherAdapter, text_after_marker};
use crate::error::{AppError, Result};
use crate::utils::http::fetch_text;

/// Extracts abstracts from `usenix.org`.
pub struct UsenixAdapter {
    client: Client,
}

impl UsenixAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn parse(html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        text_after_marker(&document, "Abstract:")
            .ok_or_else(|| AppError::crawl("usenix", "no 'Abstract:' label"))
    }
}

#[async_trait]
impl PublisherAdapter for UsenixAdapter {
    async fn fetch_abstract(&self, url: &str, _authors: &[String]) -> Result<String> {
        log::debug!("URL: {url}");
        let html = fetch_text(&self.client, url).await?;
        Self::parse(&html)
    }
}
