//! Report data structures returned by a monitor run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a single homepage probe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResult {
    pub status: Option<u16>,
    pub response_ms: u64,
    pub online: bool,
}

impl HealthResult {
    /// A probe that completed with an HTTP status
    pub fn from_status(status: u16, response_ms: u64) -> Self {
        Self {
            status: Some(status),
            response_ms,
            online: (200..300).contains(&status),
        }
    }

    /// A probe that timed out or never got a response
    pub fn unreachable(response_ms: u64) -> Self {
        Self {
            status: None,
            response_ms,
            online: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    /// `YYYY-MM-DD`, or empty when the feed date was missing or malformed
    pub date: String,
    pub source: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyNews {
    pub articles: Vec<NewsArticle>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub updated_at: DateTime<Utc>,
    pub health: BTreeMap<String, HealthResult>,
    pub news: BTreeMap<String, CompanyNews>,
}

impl MonitorReport {
    pub fn new() -> Self {
        Self {
            updated_at: Utc::now(),
            health: BTreeMap::new(),
            news: BTreeMap::new(),
        }
    }

    pub fn summary(&self) -> ReportSummary {
        let online = self.health.values().filter(|h| h.online).count();
        ReportSummary {
            companies_probed: self.health.len(),
            online,
            offline: self.health.len() - online,
            articles: self.news.values().map(|n| n.articles.len()).sum(),
        }
    }
}

impl Default for MonitorReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts logged at the end of each run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSummary {
    pub companies_probed: usize,
    pub online: usize,
    pub offline: usize,
    pub articles: usize,
}
