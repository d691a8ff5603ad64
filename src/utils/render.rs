// src/utils/render.rs

//! Page rendering for publishers that build their content with JavaScript.
//!
//! [`WebDriverRenderer`] drives a browser through a W3C WebDriver server
//! (chromedriver, geckodriver, ...) over plain HTTP. Every rendering opens a
//! fresh session and deletes it before returning, whether or not the
//! rendering succeeded.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, RenderConfig};

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// What to render and what to wait for.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Page to load
    pub url: &'a str,
    /// CSS selector that must be present before the page is read
    pub wait_for: &'a str,
    /// Upper bound on the wait for `wait_for`
    pub wait: Duration,
    /// CSS selector of a control to click (if present) before reading
    pub expand: Option<&'a str>,
}

/// Capability to load a page in a browser and return its rendered DOM.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `request.url` and return the page source after the wait
    /// condition held and the optional expansion was triggered.
    async fn fetch_rendered(&self, request: &RenderRequest<'_>) -> Result<String>;
}

/// Renderer backed by a WebDriver server.
pub struct WebDriverRenderer {
    client: reqwest::Client,
    base_url: String,
    headless: bool,
    poll_interval: Duration,
}

impl WebDriverRenderer {
    /// Create a renderer talking to the WebDriver server in `config`.
    pub fn new(config: &RenderConfig, crawler: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(crawler.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.webdriver_url.trim_end_matches('/').to_string(),
            headless: config.headless,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload: Value = response.json().await?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            Ok(value)
        } else {
            let message = value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("unknown WebDriver error");
            Err(AppError::render(url, format!("{status}: {message}")))
        }
    }

    async fn new_session(&self) -> Result<String> {
        let mut args = vec!["--disable-gpu"];
        if self.headless {
            args.push("--headless=new");
        }
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let value = self.send(Method::POST, "/session", Some(capabilities)).await?;
        value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| AppError::render(&self.base_url, "no sessionId in response"))
    }

    async fn delete_session(&self, session: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("/session/{session}"), None)
            .await
            .map(|_| ())
    }

    async fn find_elements(&self, session: &str, selector: &str) -> Result<Vec<String>> {
        let value = self
            .send(
                Method::POST,
                &format!("/session/{session}/elements"),
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;

        Ok(value
            .as_array()
            .map(|elements| {
                elements
                    .iter()
                    .filter_map(|e| e.get(ELEMENT_KEY).and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn wait_for(&self, session: &str, request: &RenderRequest<'_>) -> Result<()> {
        let deadline = Instant::now() + request.wait;
        loop {
            if !self.find_elements(session, request.wait_for).await?.is_empty() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::render(
                    request.url,
                    format!(
                        "timed out after {:?} waiting for '{}'",
                        request.wait, request.wait_for
                    ),
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn click(&self, session: &str, element: &str) -> Result<()> {
        let reference = json!({ ELEMENT_KEY: element });
        self.send(
            Method::POST,
            &format!("/session/{session}/execute/sync"),
            Some(json!({
                "script": "arguments[0].scrollIntoView(true);",
                "args": [reference]
            })),
        )
        .await?;
        self.send(
            Method::POST,
            &format!("/session/{session}/element/{element}/click"),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn drive(&self, session: &str, request: &RenderRequest<'_>) -> Result<String> {
        self.send(
            Method::POST,
            &format!("/session/{session}/url"),
            Some(json!({ "url": request.url })),
        )
        .await?;

        self.wait_for(session, request).await?;

        if let Some(expand) = request.expand {
            if let Some(control) = self.find_elements(session, expand).await?.first() {
                self.click(session, control).await?;
            }
        }

        let source = self
            .send(Method::GET, &format!("/session/{session}/source"), None)
            .await?;
        source
            .as_str()
            .map(String::from)
            .ok_or_else(|| AppError::render(request.url, "page source is not a string"))
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn fetch_rendered(&self, request: &RenderRequest<'_>) -> Result<String> {
        let session = self.new_session().await?;
        let outcome = self.drive(&session, request).await;

        if let Err(e) = self.delete_session(&session).await {
            log::debug!("Failed to close WebDriver session {session}: {e}");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn renderer(server: &Server) -> WebDriverRenderer {
        let config = RenderConfig {
            webdriver_url: server.url(),
            headless: true,
            poll_interval_ms: 10,
        };
        WebDriverRenderer::new(&config, &CrawlerConfig::default()).unwrap()
    }

    async fn mock_session(server: &mut Server) -> (mockito::Mock, mockito::Mock, mockito::Mock) {
        let create = server
            .mock("POST", "/session")
            .with_status(200)
            .with_body(r#"{"value":{"sessionId":"s1","capabilities":{}}}"#)
            .create_async()
            .await;
        let navigate = server
            .mock("POST", "/session/s1/url")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/session/s1")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .expect(1)
            .create_async()
            .await;
        (create, navigate, delete)
    }

    #[tokio::test]
    async fn test_renders_and_expands() {
        let mut server = Server::new_async().await;
        let (_create, _navigate, delete) = mock_session(&mut server).await;

        let _wait = server
            .mock("POST", "/session/s1/elements")
            .match_body(Matcher::PartialJson(json!({ "value": ".abstract-text" })))
            .with_status(200)
            .with_body(format!(r#"{{"value":[{{"{ELEMENT_KEY}":"e1"}}]}}"#))
            .create_async()
            .await;
        let _expand = server
            .mock("POST", "/session/s1/elements")
            .match_body(Matcher::PartialJson(json!({ "value": ".view-all" })))
            .with_status(200)
            .with_body(format!(r#"{{"value":[{{"{ELEMENT_KEY}":"e2"}}]}}"#))
            .create_async()
            .await;
        let _scroll = server
            .mock("POST", "/session/s1/execute/sync")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;
        let click = server
            .mock("POST", "/session/s1/element/e2/click")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .expect(1)
            .create_async()
            .await;
        let _source = server
            .mock("GET", "/session/s1/source")
            .with_status(200)
            .with_body(r#"{"value":"<div class=\"abstract-text\">Full</div>"}"#)
            .create_async()
            .await;

        let request = RenderRequest {
            url: "https://doi.org/10.1109/x",
            wait_for: ".abstract-text",
            wait: Duration::from_secs(2),
            expand: Some(".view-all"),
        };
        let html = renderer(&server).fetch_rendered(&request).await.unwrap();

        assert!(html.contains("Full"));
        click.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_session_released_on_timeout() {
        let mut server = Server::new_async().await;
        let (_create, _navigate, delete) = mock_session(&mut server).await;
        let _wait = server
            .mock("POST", "/session/s1/elements")
            .with_status(200)
            .with_body(r#"{"value":[]}"#)
            .create_async()
            .await;

        let request = RenderRequest {
            url: "https://doi.ieeecomputersociety.org/10.1109/x",
            wait_for: "article",
            wait: Duration::from_millis(50),
            expand: None,
        };
        let err = renderer(&server)
            .fetch_rendered(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Render { .. }));
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_webdriver_error_is_reported() {
        let mut server = Server::new_async().await;
        let _create = server
            .mock("POST", "/session")
            .with_status(500)
            .with_body(r#"{"value":{"error":"session not created","message":"no chrome"}}"#)
            .create_async()
            .await;

        let request = RenderRequest {
            url: "https://doi.org/10.1109/x",
            wait_for: "article",
            wait: Duration::from_millis(10),
            expand: None,
        };
        let err = renderer(&server)
            .fetch_rendered(&request)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no chrome"));
    }
}
