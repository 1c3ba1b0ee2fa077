// src/services/feed.rs

//! Client for the public lost-item feed.
//!
//! The feed is addressed by appending a 1-based inclusive index range to a
//! base URL (`{base_url}{start}/{end}`). Some deployments wrap the page in a
//! `lostArticleInfo` envelope, others serve it bare; both are accepted.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{FeedConfig, FeedPage};
use crate::utils::http::create_async_client;

/// A source of feed pages.
///
/// The reconciliation pass depends on this seam, so tests can drive it with
/// a scripted feed instead of a live endpoint.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the records at indices `start..=end` (1-based, inclusive).
    async fn fetch_page(&self, start: u32, end: u32) -> Result<FeedPage>;
}

/// HTTP implementation of [`FeedSource`].
pub struct FeedClient {
    base_url: String,
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            client: create_async_client(&config.user_agent, config.timeout_secs)?,
        })
    }

    /// Request URL for an index range.
    fn page_url(&self, start: u32, end: u32) -> String {
        format!("{}{}/{}", self.base_url, start, end)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_page(&self, start: u32, end: u32) -> Result<FeedPage> {
        check_range(start, end)?;

        let url = self.page_url(start, end);
        let context = format!("range {start}/{end}");
        log::debug!("Fetching feed page {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::feed(&context, e))?
            .error_for_status()
            .map_err(|e| AppError::feed(&context, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::feed(&context, e))?;

        parse_feed_body(&body).map_err(|e| AppError::feed(&context, e))
    }
}

/// Range constraint shared by every fetch: `1 <= start <= end`.
pub(crate) fn check_range(start: u32, end: u32) -> Result<()> {
    if start < 1 || end < start {
        return Err(AppError::validation(format!(
            "invalid feed range {start}/{end}"
        )));
    }
    Ok(())
}

/// Parse a feed body, unwrapping the `lostArticleInfo` envelope when present.
pub(crate) fn parse_feed_body(body: &str) -> Result<FeedPage> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let page = match value.get("lostArticleInfo") {
        Some(inner) => serde_json::from_value(inner.clone())?,
        None => serde_json::from_value(value)?,
    };
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "list_total_count": "2",
        "row": [
            {"ID": "F1", "STATUS": "보관중", "CATE": "가방"},
            {"ID": "F2", "STATUS": "수령", "CATE": "지갑"}
        ]
    }"#;

    #[test]
    fn page_url_appends_range_to_base() {
        let client = FeedClient::new(&FeedConfig {
            base_url: "https://openapi.example.org/KEY/json/lostArticleInfo/".to_string(),
            ..FeedConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.page_url(50, 150),
            "https://openapi.example.org/KEY/json/lostArticleInfo/50/150"
        );
    }

    #[test]
    fn range_must_be_ordered_and_one_based() {
        assert!(check_range(1, 1).is_ok());
        assert!(check_range(50, 150).is_ok());
        assert!(check_range(0, 10).is_err());
        assert!(check_range(10, 9).is_err());
    }

    #[test]
    fn parses_bare_page() {
        let page = parse_feed_body(PAGE).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.rows.len(), 2);
    }

    #[test]
    fn parses_enveloped_page() {
        let enveloped = format!("{{\"lostArticleInfo\": {PAGE}}}");
        let page = parse_feed_body(&enveloped).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.rows[0].id.as_deref(), Some("F1"));
    }

    #[test]
    fn envelope_and_bare_parse_identically() {
        let bare = parse_feed_body(PAGE).unwrap();
        let enveloped = parse_feed_body(&format!("{{\"lostArticleInfo\": {PAGE}}}")).unwrap();
        assert_eq!(bare.total_count, enveloped.total_count);
        assert_eq!(bare.rows, enveloped.rows);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_feed_body("not json").is_err());
        assert!(parse_feed_body(r#"{"row": []}"#).is_err());
    }
}
