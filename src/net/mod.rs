//! Page and stylesheet fetching plus URL helpers.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::dom::Document;
use crate::error::{Result, SpofError};

pub const DEFAULT_USER_AGENT: &str = concat!("spofcheck/", env!("CARGO_PKG_VERSION"));

/// Retrieves the body of a URL.
///
/// Anything other than a 200 response is an error.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP fetcher backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(15), DEFAULT_USER_AGENT)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_err = |message: String| SpofError::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(fetch_err(format!("HTTP status {status}")));
        }

        response.text().await.map_err(|e| fetch_err(e.to_string()))
    }
}

/// Prefix `http://` to targets given without a scheme, e.g. `www.ebay.com`.
pub fn normalize_target(target: &str) -> String {
    let lower = target.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{target}")
    }
}

/// Resolve `href` against the page URL. Returns `href` unchanged when either
/// side cannot be parsed.
pub fn resolve_url(href: &str, base: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Absolute URLs of the page's external stylesheets, without duplicates.
///
/// `<link type="text/css">` elements come first, then
/// `<link rel="stylesheet">` ones.
pub fn stylesheet_urls(dom: &Document, page_url: &str) -> Vec<String> {
    let by_type = dom.elements_by_tag("link").filter(|l| {
        l.attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("text/css"))
    });
    let by_rel = dom.elements_by_tag("link").filter(|l| {
        l.attr("rel")
            .is_some_and(|r| r.eq_ignore_ascii_case("stylesheet"))
    });

    let mut urls: Vec<String> = Vec::new();
    for link in by_type.chain(by_rel) {
        let Some(href) = link.attr("href") else {
            continue;
        };
        let absolute = resolve_url(href, page_url);
        if !urls.contains(&absolute) {
            urls.push(absolute);
        }
    }
    urls
}
