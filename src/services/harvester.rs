// src/services/harvester.rs

//! Bibliography harvester.
//!
//! Fetches the dblp listing of one conference in one year, turns every
//! `li.inproceedings` entry into a paper record, optionally enriches it with
//! an abstract, and saves it unless an identical record already exists.

use std::sync::Arc;

use reqwest::Client;
use scraper::{Html, Selector};

use super::dispatcher::AbstractDispatcher;
use super::publishers::parse_selector;
use crate::error::{AppError, Result};
use crate::models::{BibEntry, Config, ConferenceYear, PaperRecord};
use crate::storage::PaperStore;
use crate::utils::http::{fetch_text, pause};

/// Counters for one harvested unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HarvestOutcome {
    /// Papers listed on the aggregator page, duplicates included
    pub encountered: usize,
    /// Papers that were not stored yet and got saved
    pub saved: usize,
}

/// Selectors for a dblp listing page.
struct ListingSelectors {
    entry: Selector,
    title: Selector,
    author: Selector,
    link: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            entry: parse_selector("li.inproceedings")?,
            title: parse_selector("span.title")?,
            author: parse_selector(r#"span[itemprop="author"]"#)?,
            link: parse_selector("li.ee a[href]")?,
        })
    }
}

/// Harvests aggregator listings into a [`PaperStore`].
pub struct BibliographyHarvester {
    config: Arc<Config>,
    client: Client,
    dispatcher: AbstractDispatcher,
}

impl BibliographyHarvester {
    /// Create a harvester sharing `client` for listing pages.
    pub fn new(config: Arc<Config>, client: Client, dispatcher: AbstractDispatcher) -> Self {
        Self {
            config,
            client,
            dispatcher,
        }
    }

    /// Harvest one (conference, year) unit.
    ///
    /// Fails as a whole when the listing cannot be fetched or parsed; the
    /// caller decides how to continue. Abstract extraction failures never
    /// fail the unit.
    pub async fn harvest(
        &self,
        store: &dyn PaperStore,
        unit: ConferenceYear,
        want_abstract: bool,
    ) -> Result<HarvestOutcome> {
        let mut outcome = HarvestOutcome::default();
        self.harvest_into(store, unit, want_abstract, &mut outcome)
            .await?;
        Ok(outcome)
    }

    /// Like [`harvest`](Self::harvest), but counts into `outcome` as it goes.
    ///
    /// Papers saved before a store error stay committed and stay counted.
    pub async fn harvest_into(
        &self,
        store: &dyn PaperStore,
        unit: ConferenceYear,
        want_abstract: bool,
        outcome: &mut HarvestOutcome,
    ) -> Result<()> {
        let ConferenceYear { conference, year } = unit;

        let extract_abstract = if want_abstract && conference.lacks_abstracts(year) {
            log::warn!(
                "Skipping the abstract for {unit} because the website does not contain abstracts."
            );
            false
        } else {
            want_abstract
        };

        let url = self
            .config
            .aggregator
            .listing_url(conference.dblp_key(), year);
        let fetched = fetch_text(&self.client, &url).await;
        pause(&self.config.crawler).await;
        let entries = Self::parse_listing(&fetched?)
            .map_err(|e| AppError::crawl(unit.to_string(), e))?;

        for entry in &entries {
            let abstract_text = if extract_abstract {
                let text = self.dispatcher.get_abstract(conference, entry).await;
                pause(&self.config.crawler).await;
                text
            } else {
                String::new()
            };

            let paper = PaperRecord::from_entry(conference, year, entry, abstract_text);
            if !store.exists(paper.key())? {
                store.save(&paper)?;
                outcome.saved += 1;
            }
            outcome.encountered += 1;
        }

        log::debug!("Found {} papers at {unit}...", outcome.encountered);
        Ok(())
    }

    /// Parse the bibliographic entries of a listing page.
    pub fn parse_listing(html: &str) -> Result<Vec<BibEntry>> {
        let selectors = ListingSelectors::new()?;
        let document = Html::parse_document(html);

        document
            .select(&selectors.entry)
            .map(|item| -> Result<BibEntry> {
                let title = item
                    .select(&selectors.title)
                    .next()
                    .map(|t| t.text().collect::<String>())
                    .ok_or_else(|| AppError::crawl("listing", "entry without span.title"))?;
                let authors = item
                    .select(&selectors.author)
                    .map(|a| a.text().collect::<String>())
                    .collect();
                let publisher_link = item
                    .select(&selectors.link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(String::from);

                Ok(BibEntry {
                    title,
                    authors,
                    publisher_link,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mockito::{Matcher, Server};

    use super::*;
    use crate::models::Conference;
    use crate::services::publishers::{NdssAdapter, PublisherAdapter};
    use crate::storage::{PaperFilter, SqliteStore};

    struct NoAbstract;

    #[async_trait]
    impl PublisherAdapter for NoAbstract {
        async fn fetch_abstract(&self, url: &str, _authors: &[String]) -> Result<String> {
            Err(AppError::crawl(url, "not under test"))
        }
    }

    fn listing_entry(title: &str, authors: &[&str], link: &str) -> String {
        let authors: String = authors
            .iter()
            .map(|a| {
                format!(
                    r#"<span itemprop="author" itemscope><a href="/pid/1"><span itemprop="name">{a}</span></a></span>, "#
                )
            })
            .collect();
        format!(
            r#"<li class="entry inproceedings" itemscope>
                 <nav class="publ"><ul><li class="drop-down"><div class="body"><ul>
                   <li class="ee"><a href="{link}">electronic edition</a></li>
                 </ul></div></li></ul></nav>
                 <cite class="data">{authors}<span class="title" itemprop="name">{title}</span></cite>
               </li>"#
        )
    }

    fn listing(entries: &[String]) -> String {
        format!(
            r#"<html><body><header>dblp</header><ul class="publ-list">{}</ul>
               <ul><li class="editor">Not a paper</li></ul></body></html>"#,
            entries.concat()
        )
    }

    fn harvester(server: &Server, ndss: Box<dyn PublisherAdapter>) -> BibliographyHarvester {
        let mut config = Config::default();
        config.aggregator.base_url = format!("{}/db/conf", server.url());
        let dispatcher = AbstractDispatcher::with_adapters(
            ndss,
            Box::new(NoAbstract),
            Box::new(NoAbstract),
            Box::new(NoAbstract),
        );
        BibliographyHarvester::new(Arc::new(config), Client::new(), dispatcher)
    }

    fn ndss(year: i32) -> ConferenceYear {
        ConferenceYear {
            conference: Conference::Ndss,
            year,
        }
    }

    #[test]
    fn test_parse_listing() {
        let html = listing(&[
            listing_entry("Kernel Races.", &["Alice Smith", "Bob Jones"], "https://x/1"),
            listing_entry("Browser Bugs.", &[], "https://x/2"),
        ]);

        let entries = BibliographyHarvester::parse_listing(&html).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Kernel Races.");
        assert_eq!(entries[0].authors, vec!["Alice Smith", "Bob Jones"]);
        assert_eq!(entries[0].publisher_link.as_deref(), Some("https://x/1"));
        assert!(entries[1].authors.is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_entry_without_title() {
        let html = r#"<ul><li class="entry inproceedings"><cite>untitled</cite></li></ul>"#;
        assert!(BibliographyHarvester::parse_listing(html).is_err());
    }

    #[tokio::test]
    async fn test_harvest_is_idempotent() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/db/conf/ndss/ndss2020.html")
            .with_status(200)
            .with_body(listing(&[
                listing_entry("Paper A.", &["Alice"], "https://x/a"),
                listing_entry("Paper B.", &["Bob"], "https://x/b"),
            ]))
            .create_async()
            .await;

        let harvester = harvester(&server, Box::new(NoAbstract));
        let store = SqliteStore::open_in_memory().unwrap();

        let first = harvester.harvest(&store, ndss(2020), false).await.unwrap();
        let second = harvester.harvest(&store, ndss(2020), false).await.unwrap();

        assert_eq!(first, HarvestOutcome { encountered: 2, saved: 2 });
        assert_eq!(second, HarvestOutcome { encountered: 2, saved: 0 });
        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_publisher_failure_keeps_siblings() {
        let mut server = Server::new_async().await;
        let good = format!("{}/papers/good", server.url());
        let gone = format!("{}/papers/gone", server.url());

        let _listing = server
            .mock("GET", "/db/conf/ndss/ndss2021.html")
            .with_status(200)
            .with_body(listing(&[
                listing_entry("Gone Paper.", &["Alice"], &gone),
                listing_entry("Good Paper.", &["Bob"], &good),
            ]))
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/papers/gone")
            .with_status(404)
            .create_async()
            .await;
        let _good = server
            .mock("GET", "/papers/good")
            .with_status(200)
            .with_body(r#"<div class="paper-data"><p>Bob (Uni)</p><p>Good abstract.</p></div>"#)
            .create_async()
            .await;

        let harvester = harvester(&server, Box::new(NdssAdapter::new(Client::new())));
        let store = SqliteStore::open_in_memory().unwrap();

        let outcome = harvester.harvest(&store, ndss(2021), true).await.unwrap();
        assert_eq!(outcome.encountered, 2);

        let papers = store.query(&PaperFilter::all()).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Gone Paper.");
        assert_eq!(papers[0].abstract_text, "");
        assert_eq!(papers[1].abstract_text, "Good abstract.");
    }

    #[tokio::test]
    async fn test_abstract_free_unit_skips_publisher() {
        let mut server = Server::new_async().await;
        let paper_url = format!("{}/papers/p", server.url());

        let _listing = server
            .mock("GET", "/db/conf/ndss/ndss2016.html")
            .with_status(200)
            .with_body(listing(&[listing_entry("Paper.", &["Alice"], &paper_url)]))
            .create_async()
            .await;
        let publisher = server
            .mock("GET", Matcher::Regex("^/papers/".to_string()))
            .with_status(200)
            .with_body(r#"<div class="paper-data"><p>Should not be read.</p></div>"#)
            .expect(0)
            .create_async()
            .await;

        let harvester = harvester(&server, Box::new(NdssAdapter::new(Client::new())));
        let store = SqliteStore::open_in_memory().unwrap();

        let outcome = harvester.harvest(&store, ndss(2016), true).await.unwrap();

        assert_eq!(outcome.encountered, 1);
        assert_eq!(store.query(&PaperFilter::all()).unwrap()[0].abstract_text, "");
        publisher.assert_async().await;
    }

    #[tokio::test]
    async fn test_listing_failure_is_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/db/conf/ndss/ndss2003.html")
            .with_status(404)
            .create_async()
            .await;

        let harvester = harvester(&server, Box::new(NoAbstract));
        let store = SqliteStore::open_in_memory().unwrap();

        assert!(harvester.harvest(&store, ndss(2003), false).await.is_err());
        assert_eq!(store.count().unwrap(), 0);
    }
}
