//! Fan-out of health probes and news fetches across the roster

use crate::config::Config;
use crate::errors::{MonitorError, Result};
use crate::health::{HealthCheck, HttpHealthProber};
use crate::news::{FeedNewsFetcher, NewsSource};
use crate::report::{CompanyNews, HealthResult, MonitorReport, NewsArticle};
use crate::roster::Roster;

use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

/// Runs every probe and fetch for a roster and assembles one report
#[derive(Clone)]
pub struct MonitorAggregator {
    roster: Arc<Roster>,
    prober: Arc<dyn HealthCheck>,
    news: Arc<dyn NewsSource>,
}

impl MonitorAggregator {
    /// Build an aggregator backed by live HTTP probes and the configured feed
    pub fn new(config: &Config, roster: Roster) -> Result<Self> {
        config.validate().map_err(MonitorError::Config)?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(MonitorError::Http)?;

        let prober = HttpHealthProber::new(client.clone(), config.health_timeout);
        let news = FeedNewsFetcher::new(client, config);

        Ok(Self::with_sources(roster, Arc::new(prober), Arc::new(news)))
    }

    pub fn with_sources(
        roster: Roster,
        prober: Arc<dyn HealthCheck>,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            roster: Arc::new(roster),
            prober,
            news,
        }
    }

    /// Probe and fetch news for every company, waiting for all to settle.
    ///
    /// A task that panics or is cancelled drops that company from the
    /// affected map; it never fails the batch.
    pub async fn run(&self) -> Result<MonitorReport> {
        let run_id = Uuid::new_v4();
        self.roster.validate()?;

        info!(%run_id, companies = self.roster.len(), "starting monitor run");

        // Spawn everything before awaiting anything.
        let mut names = Vec::with_capacity(self.roster.len());
        let mut health_tasks: Vec<JoinHandle<HealthResult>> = Vec::with_capacity(self.roster.len());
        let mut news_tasks: Vec<JoinHandle<Vec<NewsArticle>>> = Vec::with_capacity(self.roster.len());

        for company in self.roster.iter() {
            names.push(company.name.clone());

            let prober = Arc::clone(&self.prober);
            let url = company.url.clone();
            health_tasks.push(tokio::spawn(async move { prober.check(&url).await }));

            let news = Arc::clone(&self.news);
            let terms = company.search_terms.clone();
            news_tasks.push(tokio::spawn(async move { news.latest(&terms).await }));
        }

        let (health_settled, news_settled) = tokio::join!(join_all(health_tasks), join_all(news_tasks));

        let mut report = MonitorReport::new();

        for (name, settled) in names.iter().zip(health_settled) {
            if let Some(health) = keep_settled(run_id, name, "health", settled) {
                report.health.insert(name.clone(), health);
            }
        }

        for (name, settled) in names.iter().zip(news_settled) {
            if let Some(articles) = keep_settled(run_id, name, "news", settled) {
                report.news.insert(name.clone(), CompanyNews { articles });
            }
        }

        report.updated_at = Utc::now();

        let summary = report.summary();
        info!(
            %run_id,
            probed = summary.companies_probed,
            online = summary.online,
            offline = summary.offline,
            articles = summary.articles,
            "monitor run complete"
        );

        Ok(report)
    }
}

fn keep_settled<T>(
    run_id: Uuid,
    company: &str,
    kind: &str,
    settled: std::result::Result<T, JoinError>,
) -> Option<T> {
    match settled {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%run_id, company, kind, error = %e, "task did not complete, omitting from report");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Company;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fixed answers keyed by URL / search phrase
    struct StaticHealth(HashMap<String, HealthResult>);

    #[async_trait]
    impl HealthCheck for StaticHealth {
        async fn check(&self, url: &str) -> HealthResult {
            match self.0.get(url) {
                Some(result) => result.clone(),
                None => panic!("unexpected probe of {}", url),
            }
        }
    }

    struct StaticNews {
        articles_per_company: usize,
    }

    #[async_trait]
    impl NewsSource for StaticNews {
        async fn latest(&self, search_terms: &str) -> Vec<NewsArticle> {
            (0..self.articles_per_company)
                .map(|i| NewsArticle {
                    title: format!("{} headline {}", search_terms, i),
                    url: format!("https://news.example/{}", i),
                    date: "2024-10-14".to_string(),
                    source: "Wire".to_string(),
                })
                .collect()
        }
    }

    fn two_company_roster(fast: &str, slow: &str) -> Roster {
        Roster::new(vec![
            Company::new("Fast Grain", fast, "Fast Grain"),
            Company::new("Slow Grain", slow, "Slow Grain"),
        ])
    }

    fn static_aggregator(roster: Roster) -> MonitorAggregator {
        let health = roster
            .iter()
            .map(|c| (c.url.clone(), HealthResult::from_status(200, 42)))
            .collect();
        MonitorAggregator::with_sources(
            roster,
            Arc::new(StaticHealth(health)),
            Arc::new(StaticNews { articles_per_company: 2 }),
        )
    }

    #[tokio::test]
    async fn test_every_company_reported() {
        let aggregator = static_aggregator(Roster::builtin());
        let report = aggregator.run().await.unwrap();

        assert_eq!(report.health.len(), 22);
        assert_eq!(report.news.len(), 22);
        for health in report.health.values() {
            assert!(!health.online || health.status.is_some());
        }
        assert!(report.news.values().all(|n| n.articles.len() <= 3));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let aggregator = static_aggregator(Roster::builtin());
        let first = aggregator.run().await.unwrap();
        let second = aggregator.run().await.unwrap();

        assert_eq!(first.health, second.health);
        assert_eq!(first.news, second.news);
    }

    #[tokio::test]
    async fn test_panicking_task_is_omitted() {
        let roster = two_company_roster("https://fast.example", "https://slow.example");
        let mut health = HashMap::new();
        health.insert("https://fast.example".to_string(), HealthResult::from_status(200, 10));
        // No entry for the slow URL: its probe task panics.

        let aggregator = MonitorAggregator::with_sources(
            roster,
            Arc::new(StaticHealth(health)),
            Arc::new(StaticNews { articles_per_company: 1 }),
        );
        let report = aggregator.run().await.unwrap();

        assert_eq!(report.health.len(), 1);
        assert!(report.health["Fast Grain"].online);
        assert!(!report.health.contains_key("Slow Grain"));
        assert_eq!(report.news.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_roster_fails_run() {
        let aggregator = static_aggregator(Roster::default());
        assert!(matches!(aggregator.run().await, Err(MonitorError::Roster(_))));
    }

    #[tokio::test]
    async fn test_end_to_end_slow_and_fast_homepages() {
        let fast = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&fast)
            .await;

        let slow = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&slow)
            .await;

        let feed = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<rss><channel><item><title>Only story - AgWeb</title><link>https://news.example/only</link><pubDate>Mon, 14 Oct 2024 07:00:00 GMT</pubDate></item></channel></rss>"#,
            ))
            .mount(&feed)
            .await;

        let config = Config {
            health_timeout: Duration::from_millis(300),
            news_timeout: Duration::from_secs(2),
            news_feed_url: format!("{}/rss/search", feed.uri()),
            ..Config::default()
        };
        let aggregator =
            MonitorAggregator::new(&config, two_company_roster(&fast.uri(), &slow.uri())).unwrap();

        let started = std::time::Instant::now();
        let report = aggregator.run().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(3));

        let fast_health = &report.health["Fast Grain"];
        assert!(fast_health.online);
        assert_eq!(fast_health.status, Some(200));

        let slow_health = &report.health["Slow Grain"];
        assert!(!slow_health.online);
        assert_eq!(slow_health.status, None);

        for name in ["Fast Grain", "Slow Grain"] {
            let articles = &report.news[name].articles;
            assert_eq!(articles.len(), 1);
            assert_eq!(articles[0].title, "Only story");
            assert_eq!(articles[0].source, "AgWeb");
        }
    }
}
