//! Per-page work
//!
//! The processor is the engine's unit of page work: navigate to a
//! place URL, pull out what needs persisting, and write the result
//! store record. The default implementation drives plain HTTP; a
//! browser-driven implementation plugs in at the same trait.

use crate::config::HttpConfig;
use crate::storage::{PlaceRecord, ResultStore};
use crate::times::RelativeAge;
use crate::url::derive_place_id;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Unit of per-page work executed by engine workers.
///
/// An `Ok` return means the result was persisted; an error's message
/// is what the completion path classifies.
#[async_trait]
pub trait PlaceProcessor: Send + Sync {
    async fn process(&self, url: &str) -> Result<()>;
}

/// Builds the HTTP client used by the default processor
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true);

    if let Some(host) = &config.proxy_host {
        builder = builder.proxy(reqwest::Proxy::all(host.as_str())?);
    }

    builder.build()
}

/// What the default processor pulls out of a place page.
///
/// Detailed field extraction is deliberately thin here; the payload is
/// opaque to the orchestrator and a richer processor can replace this
/// wholesale.
#[derive(Debug, Serialize)]
pub struct ExtractedPlace {
    pub title: Option<String>,
    /// Absolute RFC3339 timestamps derived from the relative markers
    pub review_dates: Vec<String>,
    /// Relative markers as rendered, for diagnostics
    pub raw_markers: Vec<String>,
}

/// HTTP-backed processor: fetches the place page, extracts the title
/// and review-date markers, and persists a [`PlaceRecord`].
pub struct HttpPlaceProcessor<B> {
    client: Client,
    store: Arc<Mutex<B>>,
}

impl<B: ResultStore> HttpPlaceProcessor<B> {
    pub fn new(client: Client, store: Arc<Mutex<B>>) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl<B: ResultStore + Send + 'static> PlaceProcessor for HttpPlaceProcessor<B> {
    async fn process(&self, url: &str) -> Result<()> {
        let place_id = derive_place_id(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request failed for {}", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP {} for {}", status, url));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("text/html") {
            return Err(anyhow!("Expected HTML for {}, got {}", url, content_type));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read body of {}", url))?;

        let extracted = extract_place(&body);
        let payload =
            serde_json::to_string(&extracted).context("failed to encode place payload")?;
        let record = PlaceRecord::new(place_id, url.to_string(), extracted.title.clone(), payload);

        let inserted = {
            let mut store = self.store.lock().unwrap();
            store.insert(&record)?
        };

        if inserted {
            tracing::info!("Place {} stored successfully", record.place_id);
        } else {
            tracing::info!(
                "Place {} already stored, keeping existing record",
                record.place_id
            );
        }

        Ok(())
    }
}

/// Extracts the title and review date markers from rendered HTML.
///
/// Markers come from the two span classes the review feed renders:
/// `rsqaWe` for plain relative dates and `xRkPPb` for dates suffixed
/// with the reviewing platform ("… on <site>"), trimmed at " on".
pub fn extract_place(body: &str) -> ExtractedPlace {
    let document = Html::parse_document(body);

    let title = Selector::parse("h1").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    });

    let mut raw_markers = Vec::new();
    for class in [".rsqaWe", ".xRkPPb"] {
        if let Ok(selector) = Selector::parse(class) {
            for element in document.select(&selector) {
                let text = element.text().collect::<String>();
                let marker = text.trim().split(" on").next().unwrap_or("").trim();
                if !marker.is_empty() {
                    raw_markers.push(marker.to_string());
                }
            }
        }
    }

    let review_dates = raw_markers
        .iter()
        .filter_map(|marker| RelativeAge::parse(marker))
        .map(|age| age.before_now().to_rfc3339())
        .collect();

    ExtractedPlace {
        title,
        review_dates,
        raw_markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_and_markers() {
        let body = r#"
            <html><body>
            <h1>Blue Cafe</h1>
            <div class="review"><span class="rsqaWe">2 months ago</span></div>
            <div class="review"><span class="rsqaWe">a year ago</span></div>
            </body></html>
        "#;

        let extracted = extract_place(body);
        assert_eq!(extracted.title.as_deref(), Some("Blue Cafe"));
        assert_eq!(extracted.raw_markers, vec!["2 months ago", "a year ago"]);
        assert_eq!(extracted.review_dates.len(), 2);
    }

    #[test]
    fn test_extract_trims_platform_suffix() {
        let body = r#"
            <html><body>
            <h1>Blue Cafe</h1>
            <span class="xRkPPb">3 years ago on Tripadvisor</span>
            </body></html>
        "#;

        let extracted = extract_place(body);
        assert_eq!(extracted.raw_markers, vec!["3 years ago"]);
    }

    #[test]
    fn test_extract_handles_missing_content() {
        let extracted = extract_place("<html><body><p>nothing here</p></body></html>");
        assert!(extracted.title.is_none());
        assert!(extracted.raw_markers.is_empty());
        assert!(extracted.review_dates.is_empty());
    }

    #[test]
    fn test_unparseable_markers_are_kept_raw_only() {
        let body = r#"<html><body><span class="rsqaWe">recently</span></body></html>"#;

        let extracted = extract_place(body);
        assert_eq!(extracted.raw_markers, vec!["recently"]);
        assert!(extracted.review_dates.is_empty());
    }
}
