//! Configuration management for the company monitor

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Optional JSON roster file; the built-in roster is used when unset
    pub roster_path: Option<PathBuf>,

    /// Ceiling for a single homepage probe
    pub health_timeout: Duration,

    /// Ceiling for a single news feed request
    pub news_timeout: Duration,

    /// Base URL of the news search feed
    pub news_feed_url: String,

    /// Feed language, e.g. `en-US`
    pub news_language: String,

    /// Feed region, e.g. `US`
    pub news_region: String,

    /// Maximum articles kept per company
    pub max_articles: usize,

    /// Shared cache lifetime advertised on the report
    pub cache_max_age_secs: u64,

    /// Window in which a stale report may be served while revalidating
    pub stale_while_revalidate_secs: u64,

    /// User agent sent on outbound requests
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            roster_path: None,
            health_timeout: Duration::from_secs(5),
            news_timeout: Duration::from_secs(8),
            news_feed_url: "https://news.google.com/rss/search".to_string(),
            news_language: "en-US".to_string(),
            news_region: "US".to_string(),
            max_articles: 3,
            cache_max_age_secs: 21600,
            stale_while_revalidate_secs: 3600,
            user_agent: format!("company_monitor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(bind_address) = env::var("BIND_ADDRESS") {
            config.bind_address = bind_address;
        }

        if let Ok(roster_path) = env::var("ROSTER_PATH") {
            if !roster_path.trim().is_empty() {
                config.roster_path = Some(PathBuf::from(roster_path.trim()));
            }
        }

        if let Ok(timeout) = env::var("HEALTH_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                config.health_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(timeout) = env::var("NEWS_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                config.news_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(feed_url) = env::var("NEWS_FEED_URL") {
            config.news_feed_url = feed_url;
        }

        if let Ok(language) = env::var("NEWS_LANGUAGE") {
            config.news_language = language;
        }

        if let Ok(region) = env::var("NEWS_REGION") {
            config.news_region = region;
        }

        if let Ok(max_articles) = env::var("MAX_ARTICLES") {
            if let Ok(max) = max_articles.parse() {
                config.max_articles = max;
            }
        }

        if let Ok(max_age) = env::var("CACHE_MAX_AGE_SECONDS") {
            if let Ok(seconds) = max_age.parse() {
                config.cache_max_age_secs = seconds;
            }
        }

        if let Ok(swr) = env::var("STALE_WHILE_REVALIDATE_SECONDS") {
            if let Ok(seconds) = swr.parse() {
                config.stale_while_revalidate_secs = seconds;
            }
        }

        if let Ok(user_agent) = env::var("MONITOR_USER_AGENT") {
            config.user_agent = user_agent;
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_address.is_empty() {
            return Err("bind_address cannot be empty".to_string());
        }

        if self.health_timeout.is_zero() {
            return Err("health_timeout must be greater than 0".to_string());
        }

        if self.news_timeout.is_zero() {
            return Err("news_timeout must be greater than 0".to_string());
        }

        if !(self.news_feed_url.starts_with("http://") || self.news_feed_url.starts_with("https://")) {
            return Err(format!(
                "news_feed_url must be an absolute http(s) URL, got '{}'",
                self.news_feed_url
            ));
        }

        if self.max_articles == 0 {
            return Err("max_articles must be greater than 0".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }

        Ok(())
    }

    /// `Cache-Control` value attached to successful reports
    pub fn cache_control(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate={}",
            self.cache_max_age_secs, self.stale_while_revalidate_secs
        )
    }

    /// Feed edition identifier, `<region>:<language subtag>`
    pub fn feed_locale(&self) -> String {
        let language = self
            .news_language
            .split('-')
            .next()
            .unwrap_or(&self.news_language);
        format!("{}:{}", self.news_region, language)
    }
}
