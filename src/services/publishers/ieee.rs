//! IEEE S&P pages, served either by the Computer Society digital library or
//! by IEEE Xplore. Both build the abstract client-side, so extraction goes
//! through a [`PageRenderer`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use super::{PublisherAdapter, joined_text, parse_selector};
use crate::error::{AppError, Result};
use crate::models::BibEntry;
use crate::utils::render::{PageRenderer, RenderRequest};
use crate::utils::{get_domain, with_host};

/// Computer Society DOI indirection host.
pub const COMPUTER_SOCIETY_HOST: &str = "doi.ieeecomputersociety.org";
/// Generic DOI redirector; IEEE DOIs resolve to IEEE Xplore.
pub const DOI_HOST: &str = "doi.org";

const XPLORE_PREFIX: &str = "Abstract:\n";
const XPLORE_SUFFIX: &str = "\n(Show Less)";

/// Where a normalized IEEE link leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    ComputerSociety,
    Xplore,
}

/// Extracts abstracts for IEEE S&P papers.
pub struct IeeeAdapter {
    renderer: Arc<dyn PageRenderer>,
}

impl IeeeAdapter {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// Rewrite links on unknown hosts onto the Computer Society indirection
    /// host so only two hosts remain to be handled.
    fn normalize(url: &str) -> Result<String> {
        let host = get_domain(url).ok_or_else(|| AppError::crawl(url, "link has no host"))?;
        if host == COMPUTER_SOCIETY_HOST || host == DOI_HOST {
            Ok(url.to_string())
        } else {
            with_host(url, COMPUTER_SOCIETY_HOST)
        }
    }

    fn route(url: &str) -> Result<Route> {
        match get_domain(url).as_deref() {
            Some(COMPUTER_SOCIETY_HOST) => Ok(Route::ComputerSociety),
            Some(DOI_HOST) => Ok(Route::Xplore),
            _ => Err(AppError::crawl(url, "unsupported IEEE host")),
        }
    }

    fn parse_computer_society(html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let content_sel = parse_selector("article .article-content")?;
        document
            .select(&content_sel)
            .next()
            .map(joined_text)
            .ok_or_else(|| AppError::crawl("computer.org", "no .article-content"))
    }

    fn parse_xplore(html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let abstract_sel = parse_selector(".abstract-text")?;
        let text = document
            .select(&abstract_sel)
            .next()
            .map(joined_text)
            .ok_or_else(|| AppError::crawl("ieeexplore", "no .abstract-text"))?;
        Ok(strip_xplore_boilerplate(&text).to_string())
    }
}

/// Drop the `Abstract:` heading and the `(Show Less)` toggle Xplore renders
/// around the expanded abstract.
fn strip_xplore_boilerplate(text: &str) -> &str {
    let text = match text.find(XPLORE_PREFIX) {
        Some(idx) => &text[idx + XPLORE_PREFIX.len()..],
        None => text,
    };
    match text.find(XPLORE_SUFFIX) {
        Some(idx) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl PublisherAdapter for IeeeAdapter {
    fn publisher_url(&self, entry: &BibEntry) -> Result<String> {
        let link = entry
            .publisher_link
            .as_deref()
            .ok_or_else(|| AppError::crawl(&entry.title, "no electronic edition link"))?;
        Self::normalize(link)
    }

    async fn fetch_abstract(&self, url: &str, _authors: &[String]) -> Result<String> {
        log::debug!("URL: {url}");
        match Self::route(url)? {
            Route::ComputerSociety => {
                let request = RenderRequest {
                    url,
                    wait_for: "article",
                    wait: Duration::from_secs(3),
                    expand: None,
                };
                let html = self.renderer.fetch_rendered(&request).await?;
                Self::parse_computer_society(&html)
            }
            Route::Xplore => {
                let request = RenderRequest {
                    url,
                    wait_for: ".abstract-text",
                    wait: Duration::from_secs(2),
                    expand: Some(".abstract-text-view-all"),
                };
                let html = self.renderer.fetch_rendered(&request).await?;
                Self::parse_xplore(&html)
            }
        }
    }
}
