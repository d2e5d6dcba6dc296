//! Company news retrieval from a syndication search feed

use crate::config::Config;
use crate::errors::{MonitorError, Result};
use crate::feed_parser::parse_articles;
use crate::report::NewsArticle;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Source of recent headlines for a search phrase. Implementations never
/// fail; any problem yields an empty list.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn latest(&self, search_terms: &str) -> Vec<NewsArticle>;
}

/// Fetches headlines from an RSS search endpoint
#[derive(Debug, Clone)]
pub struct FeedNewsFetcher {
    client: Client,
    feed_url: String,
    language: String,
    region: String,
    locale: String,
    timeout: Duration,
    max_articles: usize,
}

impl FeedNewsFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            feed_url: config.news_feed_url.clone(),
            language: config.news_language.clone(),
            region: config.news_region.clone(),
            locale: config.feed_locale(),
            timeout: config.news_timeout,
            max_articles: config.max_articles,
        }
    }

    /// Search URL for a phrase. The query is form-encoded, so spaces go out
    /// as `+` rather than `%20`; the feed treats both the same.
    pub fn feed_query_url(&self, search_terms: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.feed_url,
            &[
                ("q", search_terms),
                ("hl", self.language.as_str()),
                ("gl", self.region.as_str()),
                ("ceid", self.locale.as_str()),
            ],
        )
        .map_err(|e| MonitorError::Config(format!("invalid news feed URL '{}': {}", self.feed_url, e)))
    }

    async fn try_fetch(&self, search_terms: &str) -> Result<Vec<NewsArticle>> {
        let url = self.feed_query_url(search_terms)?;

        let body = timeout(self.timeout, async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(MonitorError::Upstream(format!(
                    "feed returned {} for '{}'",
                    status, search_terms
                )));
            }
            Ok::<_, MonitorError>(response.text().await?)
        })
        .await
        .map_err(|_| {
            MonitorError::Timeout(format!(
                "feed request for '{}' exceeded {}ms",
                search_terms,
                self.timeout.as_millis()
            ))
        })??;

        parse_articles(&body, self.max_articles)
    }
}

#[async_trait]
impl NewsSource for FeedNewsFetcher {
    async fn latest(&self, search_terms: &str) -> Vec<NewsArticle> {
        match self.try_fetch(search_terms).await {
            Ok(articles) => {
                debug!(search_terms, articles = articles.len(), "feed fetched");
                articles
            }
            Err(e) => {
                warn!(search_terms, error = %e, "news fetch failed");
                Vec::new()
            }
        }
    }
}
