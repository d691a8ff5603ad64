//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Earliest year harvested from the aggregator.
pub const FIRST_YEAR: i32 = 2000;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Bibliography aggregator settings
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Headless browser settings for JavaScript-rendered publishers
    #[serde(default)]
    pub render: RenderConfig,

    /// Paper database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.aggregator.start_year < FIRST_YEAR {
            return Err(AppError::validation(format!(
                "aggregator.start_year must be >= {FIRST_YEAR}"
            )));
        }
        if url::Url::parse(&self.aggregator.base_url).is_err() {
            return Err(AppError::validation("aggregator.base_url is not a URL"));
        }
        if self.render.poll_interval_ms == 0 {
            return Err(AppError::validation("render.poll_interval_ms must be > 0"));
        }
        if self.database.path.trim().is_empty() {
            return Err(AppError::validation("database.path is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Overall per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Bibliography aggregator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Base of the per-conference listing URLs
    #[serde(default = "defaults::aggregator_base_url")]
    pub base_url: String,

    /// First year to harvest
    #[serde(default = "defaults::start_year")]
    pub start_year: i32,
}

impl AggregatorConfig {
    /// Listing page URL for one conference in one year.
    pub fn listing_url(&self, dblp_key: &str, year: i32) -> String {
        format!(
            "{}/{key}/{key}{year}.html",
            self.base_url.trim_end_matches('/'),
            key = dblp_key
        )
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::aggregator_base_url(),
            start_year: defaults::start_year(),
        }
    }
}

/// WebDriver settings used to render IEEE pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Address of a running WebDriver server (e.g. chromedriver)
    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Interval between element presence checks in milliseconds
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            webdriver_url: defaults::webdriver_url(),
            headless: defaults::headless(),
            poll_interval_ms: defaults::poll_interval(),
        }
    }
}

/// Paper database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file
    #[serde(default = "defaults::database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::database_path(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; confgrep/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        0
    }

    // Aggregator defaults
    pub fn aggregator_base_url() -> String {
        "https://dblp.org/db/conf".into()
    }
    pub fn start_year() -> i32 {
        super::FIRST_YEAR
    }

    // Render defaults
    pub fn webdriver_url() -> String {
        "http://localhost:9515".into()
    }
    pub fn headless() -> bool {
        true
    }
    pub fn poll_interval() -> u64 {
        100
    }

    // Database defaults
    pub fn database_path() -> String {
        "papers.db".into()
    }
}
