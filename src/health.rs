//! Homepage reachability probes

use crate::errors::{MonitorError, Result};
use crate::report::HealthResult;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// Classifies whether a URL is reachable. Implementations never fail;
/// every error is folded into an offline [`HealthResult`].
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self, url: &str) -> HealthResult;
}

/// Probes homepages with a bounded `HEAD` request
#[derive(Debug, Clone)]
pub struct HttpHealthProber {
    client: Client,
    timeout: Duration,
}

impl HttpHealthProber {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Single probe attempt, returning the final HTTP status
    async fn try_probe(&self, url: &str) -> Result<u16> {
        let response = timeout(self.timeout, self.client.head(url).send())
            .await
            .map_err(|_| {
                MonitorError::Timeout(format!(
                    "no response from {} within {}ms",
                    url,
                    self.timeout.as_millis()
                ))
            })?
            .map_err(MonitorError::Http)?;

        Ok(response.status().as_u16())
    }
}

#[async_trait]
impl HealthCheck for HttpHealthProber {
    async fn check(&self, url: &str) -> HealthResult {
        let start = Instant::now();
        let outcome = self.try_probe(url).await;
        let response_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(status) => {
                debug!(url, status, response_ms, "probe completed");
                HealthResult::from_status(status, response_ms)
            }
            Err(e) => {
                debug!(url, response_ms, error = %e, "probe failed");
                HealthResult::unreachable(response_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober(timeout_ms: u64) -> HttpHealthProber {
        HttpHealthProber::new(Client::new(), Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn test_reachable_homepage() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = prober(2000).check(&server.uri()).await;
        assert!(result.online);
        assert_eq!(result.status, Some(200));
    }

    #[tokio::test]
    async fn test_error_status_is_offline() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = prober(2000).check(&server.uri()).await;
        assert!(!result.online);
        assert_eq!(result.status, Some(503));
    }

    #[tokio::test]
    async fn test_slow_homepage_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let result = prober(200).check(&server.uri()).await;
        assert!(!result.online);
        assert_eq!(result.status, None);
        assert!(result.response_ms >= 200);
        assert!(result.response_ms < 3000);
    }

    #[tokio::test]
    async fn test_connection_refused_is_offline() {
        // Port 9 (discard) is not expected to be listening on loopback.
        let result = prober(2000).check("http://127.0.0.1:9/").await;
        assert!(!result.online);
        assert_eq!(result.status, None);
    }
}
