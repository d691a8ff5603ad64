// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body, treating any non-200 status as a failure.
///
/// The body is returned as text so callers can parse it without holding a
/// DOM across an await point.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(AppError::crawl(url, format!("unexpected status {status}")));
    }
    Ok(response.text().await?)
}

/// Sleep between requests when a politeness delay is configured.
pub async fn pause(config: &CrawlerConfig) {
    if config.request_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
    }
}
