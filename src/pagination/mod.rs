//! Review-feed pagination termination
//!
//! Repeatedly triggers "load more" on a scrollable review feed and
//! stops once the oldest visible marker is a year old, the feed is
//! exhausted, or the iteration ceiling is hit. The heuristic inspects
//! only the last marker of each batch and assumes the feed renders in
//! reverse-chronological order; both are known approximations.

use crate::config::ScrollConfig;
use crate::times::{RelativeAge, TimeUnit};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A scrollable review feed the terminator can drive
#[async_trait]
pub trait ReviewFeed: Send {
    /// Triggers one "load more" action (e.g. scroll to bottom).
    /// Returns `false` when the feed cannot load further content.
    async fn load_more(&mut self) -> Result<bool>;

    /// Relative-date markers currently rendered, oldest last
    async fn date_markers(&mut self) -> Result<Vec<String>>;
}

/// Why scrolling stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The last visible marker reached year-scale age
    ContentStale,
    /// The feed reported no further content
    FeedExhausted,
    /// The iteration ceiling was hit
    LimitReached,
}

/// Returns true when the last marker of the batch parses to a
/// year-scale age. Empty batches and unparseable markers keep the
/// scroll going.
pub fn should_stop_scrolling(markers: &[String]) -> bool {
    let Some(last) = markers.last() else {
        return false;
    };
    matches!(
        RelativeAge::parse(last),
        Some(age) if age.unit == TimeUnit::Year
    )
}

/// Drives the feed until content is stale, the feed is exhausted, or
/// the iteration ceiling is reached.
pub async fn scroll_to_staleness(
    feed: &mut dyn ReviewFeed,
    config: &ScrollConfig,
) -> Result<ScrollOutcome> {
    let settle = Duration::from_millis(config.settle_ms);

    for iteration in 0..config.max_iterations {
        let advanced = feed.load_more().await?;
        if !advanced {
            tracing::debug!("Feed exhausted after {} iterations", iteration + 1);
            return Ok(ScrollOutcome::FeedExhausted);
        }

        tokio::time::sleep(settle).await;

        let markers = feed.date_markers().await?;
        if should_stop_scrolling(&markers) {
            tracing::debug!(
                "Oldest visible marker is year-scale, stopping after {} iterations",
                iteration + 1
            );
            return Ok(ScrollOutcome::ContentStale);
        }
    }

    tracing::error!("Reached scroll iteration limit {}", config.max_iterations);
    Ok(ScrollOutcome::LimitReached)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed stub that reveals one more batch of markers per iteration
    struct ScriptedFeed {
        batches: Vec<Vec<String>>,
        position: usize,
    }

    impl ScriptedFeed {
        fn new(batches: Vec<Vec<&str>>) -> Self {
            Self {
                batches: batches
                    .into_iter()
                    .map(|batch| batch.into_iter().map(String::from).collect())
                    .collect(),
                position: 0,
            }
        }
    }

    #[async_trait]
    impl ReviewFeed for ScriptedFeed {
        async fn load_more(&mut self) -> Result<bool> {
            if self.position < self.batches.len() {
                self.position += 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        async fn date_markers(&mut self) -> Result<Vec<String>> {
            Ok(self
                .batches
                .get(self.position.saturating_sub(1))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn create_test_scroll_config(max_iterations: u32) -> ScrollConfig {
        ScrollConfig {
            max_iterations,
            settle_ms: 0,
        }
    }

    #[test]
    fn test_should_stop_on_year_marker() {
        let markers = vec!["2 months ago".to_string(), "a year ago".to_string()];
        assert!(should_stop_scrolling(&markers));
    }

    #[test]
    fn test_should_stop_on_plural_years() {
        let markers = vec!["3 years ago".to_string()];
        assert!(should_stop_scrolling(&markers));
    }

    #[test]
    fn test_should_continue_on_recent_marker() {
        let markers = vec!["a year ago".to_string(), "2 months ago".to_string()];
        assert!(!should_stop_scrolling(&markers));
    }

    #[test]
    fn test_should_continue_on_empty_or_unparseable() {
        assert!(!should_stop_scrolling(&[]));
        assert!(!should_stop_scrolling(&["recently".to_string()]));
    }

    #[tokio::test]
    async fn test_scroll_stops_when_content_goes_stale() {
        let mut feed = ScriptedFeed::new(vec![
            vec!["2 days ago"],
            vec!["2 days ago", "3 months ago"],
            vec!["2 days ago", "3 months ago", "2 years ago"],
            vec!["should never load this"],
        ]);

        let outcome = scroll_to_staleness(&mut feed, &create_test_scroll_config(30))
            .await
            .unwrap();
        assert_eq!(outcome, ScrollOutcome::ContentStale);
        assert_eq!(feed.position, 3);
    }

    #[tokio::test]
    async fn test_scroll_stops_at_iteration_limit() {
        let mut feed = ScriptedFeed::new(vec![
            vec!["1 day ago"],
            vec!["2 days ago"],
            vec!["3 days ago"],
            vec!["4 days ago"],
        ]);

        let outcome = scroll_to_staleness(&mut feed, &create_test_scroll_config(2))
            .await
            .unwrap();
        assert_eq!(outcome, ScrollOutcome::LimitReached);
        assert_eq!(feed.position, 2);
    }

    #[tokio::test]
    async fn test_scroll_stops_when_feed_is_exhausted() {
        let mut feed = ScriptedFeed::new(vec![vec!["1 day ago"], vec!["2 days ago"]]);

        let outcome = scroll_to_staleness(&mut feed, &create_test_scroll_config(30))
            .await
            .unwrap();
        assert_eq!(outcome, ScrollOutcome::FeedExhausted);
    }
}
