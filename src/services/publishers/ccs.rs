//! ACM Digital Library pages for CCS.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use super::{PublisherAdapter, joined_text, parse_selector};
use crate::error::{AppError, Result};
use crate::utils::http::fetch_text;

/// Extracts abstracts from `dl.acm.org`.
///
/// The ACM library rate-limits aggressively; keep `request_delay_ms` set
/// when harvesting CCS abstracts.
pub struct CcsAdapter {
    client: Client,
}

impl CcsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn parse(html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let full_sel = parse_selector("div.abstractInFull")?;
        document
            .select(&full_sel)
            .next()
            .map(joined_text)
            .ok_or_else(|| AppError::crawl("ccs", "no div.abstractInFull"))
    }
}

#[async_trait]
impl PublisherAdapter for CcsAdapter {
    async fn fetch_abstract(&self, url: &str, _authors: &[String]) -> Result<String> {
        log::debug!("URL: {url}");
        let html = fetch_text(&self.client, url).await?;
        Self::parse(&html)
    }
}
