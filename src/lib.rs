//! Company Health & News Monitor
//!
//! Probes the homepages of a roster of grain quality inspection companies,
//! pulls a few recent headlines for each from a news search feed, and serves
//! the combined result as a single JSON report.

pub mod config;
pub mod roster;
pub mod report;
pub mod feed_parser;
pub mod health;
pub mod news;
pub mod aggregator;
pub mod server;
pub mod errors;

pub use config::Config;
pub use roster::{Company, Roster};
pub use report::{CompanyNews, HealthResult, MonitorReport, NewsArticle};
pub use aggregator::MonitorAggregator;
pub use errors::{MonitorError, Result};
