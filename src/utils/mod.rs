//! Utility functions and helpers.

pub mod http;
pub mod render;

use url::Url;

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Rewrite the host of `url_str`, keeping scheme, path, query and fragment.
pub fn with_host(url_str: &str, host: &str) -> crate::error::Result<String> {
    let mut url = Url::parse(url_str)?;
    url.set_host(Some(host))?;
    // Drop any port from the original host as well.
    let _ = url.set_port(None);
    Ok(url.to_string())
}
