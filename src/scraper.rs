//! Web scraping module for content extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use crate::config::ScraperConfig;
use reqwest::Client;
use scraper::{Html, Node};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// User-Agent string identifying this scraper
const USER_AGENT: &str = concat!("pagebrief/", env!("CARGO_PKG_VERSION"));

/// Elements whose text never counts as visible content
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "img", "input"];

/// Element whose content the parser keeps as unparsed text
const NOSCRIPT_TAG: &str = "noscript";

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("[Error scraping page]: invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("[Error scraping page]: request timed out after {0} seconds")]
    Timeout(u64),
    #[error("[Error scraping page]: failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("[Error scraping page]: HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Fetches pages and reduces them to their visible text.
#[derive(Clone)]
pub struct Scraper {
    client: Client,
    timeout_secs: u64,
}

impl Scraper {
    /// Create a configured HTTP client for scraping
    pub fn new(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.timeout,
        })
    }

    /// Fetch a page and return its visible text, newline-joined
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let url = parse_http_url(url)?;
        debug!(%url, "fetching page");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout(self.timeout_secs)
            } else {
                ScrapeError::FetchError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout(self.timeout_secs)
            } else {
                ScrapeError::FetchError(e)
            }
        })?;

        Ok(extract_text(&html))
    }

    /// Like [`fetch_text`](Self::fetch_text), but renders failures as the
    /// page content itself.
    pub async fn fetch_text_inline(&self, url: &str) -> String {
        match self.fetch_text(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %e, "scrape failed");
                e.to_string()
            }
        }
    }
}

fn parse_http_url(raw: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScrapeError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScrapeError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

/// Extract visible text from an HTML document.
///
/// Every text node outside script, style, img and input elements is trimmed;
/// empty nodes are dropped and the rest joined with newlines. The parser runs
/// with scripting enabled, so `<noscript>` bodies arrive as raw markup; they
/// are parsed again as fragments and filtered the same way.
pub fn extract_text(html: &str) -> String {
    let mut lines = Vec::new();
    collect_lines(&Html::parse_document(html), &mut lines);
    lines.join("\n")
}

fn collect_lines(document: &Html, lines: &mut Vec<String>) {
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let mut hidden = false;
        let mut in_noscript = false;
        for element in node.ancestors().filter_map(|a| a.value().as_element()) {
            if SKIPPED_TAGS.contains(&element.name()) {
                hidden = true;
                break;
            }
            if element.name() == NOSCRIPT_TAG {
                in_noscript = true;
            }
        }
        if hidden {
            continue;
        }

        if in_noscript {
            collect_lines(&Html::parse_fragment(text), lines);
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_non_content_tags() {
        let html = r#"<html>
            <head><title>Page</title><style>body { color: red; }</style></head>
            <body>
                <h1>Heading</h1>
                <script>var secret = 1;</script>
                <p>First   paragraph.</p>
                <img src="a.png" alt="ignored">
                <input value="typed">
                <ul><li>One</li><li>Two</li></ul>
            </body>
        </html>"#;

        let text = extract_text(html);
        assert_eq!(text, "Page\nHeading\nFirst   paragraph.\nOne\nTwo");
        assert!(!text.contains("secret"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_inline_elements_become_separate_lines() {
        let text = extract_text("<p>Hello <b>world</b>!</p>");
        assert_eq!(text, "Hello\nworld\n!");
    }

    #[test]
    fn test_noscript_markup_does_not_leak() {
        let html = r#"<html><head><title>T</title></head><body>
            <noscript><iframe src="https://www.googletagmanager.com/ns.html?id=GTM-X"
                height="0" width="0" style="display:none"></iframe></noscript>
            <p>Real</p>
            <noscript><img src="pixel.gif"><p>Please enable JavaScript.</p></noscript>
        </body></html>"#;

        let text = extract_text(html);
        assert!(!text.contains('<'), "markup leaked: {text:?}");
        assert!(!text.contains("pixel.gif"));
        assert_eq!(text, "T\nReal\nPlease enable JavaScript.");
    }

    #[test]
    fn test_empty_document_yields_empty_text() {
        assert_eq!(extract_text("<html><body>  </body></html>"), "");
    }

    #[test]
    fn test_rejects_malformed_urls() {
        assert!(matches!(
            parse_http_url("not a url"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_http_url("ftp://example.com/file"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
        assert!(parse_http_url(" https://example.com/ ").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_renders_inline_error() {
        let scraper = Scraper::new(&ScraperConfig::default()).unwrap();
        let text = scraper.fetch_text_inline("example.com").await;
        assert!(text.starts_with("[Error scraping page]:"));
    }
}
