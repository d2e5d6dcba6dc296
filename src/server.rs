//! HTTP surface for monitor reports

use crate::aggregator::MonitorAggregator;
use crate::config::Config;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use tracing::{error, info};

const MONITOR_FAILURE_MESSAGE: &str = "Failed to fetch company monitor data";

pub struct AppState {
    pub aggregator: MonitorAggregator,
    pub cache_control: String,
}

impl AppState {
    pub fn new(config: &Config, aggregator: MonitorAggregator) -> Self {
        Self {
            aggregator,
            cache_control: config.cache_control(),
        }
    }
}

/// Register the monitor routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/company-monitor", web::get().to(company_monitor))
        .route("/health", web::get().to(health_check));
}

// Liveness endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn company_monitor(data: web::Data<AppState>) -> impl Responder {
    let report = match data.aggregator.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "company monitor run failed");
            return internal_error();
        }
    };

    match serde_json::to_string(&report) {
        Ok(body) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, data.cache_control.clone()))
            .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
            .content_type("application/json")
            .body(body),
        Err(e) => {
            error!(error = %e, "failed to serialize monitor report");
            internal_error()
        }
    }
}

// Details stay in the server log; callers get a fixed message.
fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .json(json!({ "error": MONITOR_FAILURE_MESSAGE }))
}

/// Bind and run the HTTP server until shutdown
pub async fn serve(config: Config, aggregator: MonitorAggregator) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(&config, aggregator));

    info!("company monitor listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(config.bind_address.as_str())?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthCheck;
    use crate::news::NewsSource;
    use crate::report::{HealthResult, NewsArticle};
    use crate::roster::{Company, Roster};
    use actix_web::test;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AlwaysUp;

    #[async_trait]
    impl HealthCheck for AlwaysUp {
        async fn check(&self, _url: &str) -> HealthResult {
            HealthResult::from_status(200, 15)
        }
    }

    struct NoNews;

    #[async_trait]
    impl NewsSource for NoNews {
        async fn latest(&self, _search_terms: &str) -> Vec<NewsArticle> {
            Vec::new()
        }
    }

    fn state(roster: Roster) -> web::Data<AppState> {
        let aggregator = MonitorAggregator::with_sources(roster, Arc::new(AlwaysUp), Arc::new(NoNews));
        web::Data::new(AppState::new(&Config::default(), aggregator))
    }

    #[actix_web::test]
    async fn test_report_endpoint() {
        let roster = Roster::new(vec![Company::new("GrainSense", "https://www.grainsense.com", "GrainSense")]);
        let app = test::init_service(App::new().app_data(state(roster)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/company-monitor").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "s-maxage=21600, stale-while-revalidate=3600"
        );
        assert_eq!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["updatedAt"].is_string());
        assert_eq!(body["health"]["GrainSense"]["online"], true);
        assert_eq!(body["health"]["GrainSense"]["responseMs"], 15);
        assert_eq!(body["news"]["GrainSense"]["articles"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_failed_run_returns_500() {
        let app = test::init_service(App::new().app_data(state(Roster::default())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/company-monitor").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 500);
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "error": MONITOR_FAILURE_MESSAGE }));
    }

    #[actix_web::test]
    async fn test_duplicate_roster_error_is_not_exposed() {
        let roster = Roster::new(vec![
            Company::new("Dup", "https://one.example", "Dup"),
            Company::new("Dup", "https://two.example", "Dup"),
        ]);
        let app = test::init_service(App::new().app_data(state(roster)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/company-monitor").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);

        let body = test::read_body(resp).await;
        let text = String::from_utf8_lossy(&body);
        assert!(!text.contains("duplicate"));
        assert!(!text.contains("Roster error"));
        assert!(text.contains(MONITOR_FAILURE_MESSAGE));
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(App::new().app_data(state(Roster::builtin())).configure(configure)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
