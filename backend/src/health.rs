use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;
use shared::datasource::{Connector, DataSource};
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::datasource::{Gateway, SurrealConnector};

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct ServiceHealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ServiceHealthStatus {
    fn healthy() -> Self {
        Self { status: "healthy".to_string(), message: None, response_time_ms: None }
    }

    fn unhealthy(message: String) -> Self {
        Self { status: "unhealthy".to_string(), message: Some(message), response_time_ms: None }
    }

    fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Opens a handle with the current settings and reads the server version
pub async fn check_data_source<C: Connector>(gateway: &Gateway<C>) -> ServiceHealthStatus {
    if !gateway.settings().current().await.is_configured() {
        return ServiceHealthStatus::unhealthy("Connection settings not configured".to_string());
    }

    let start = Instant::now();
    match timeout(
        CHECK_TIMEOUT,
        gateway.run(|db| Box::pin(async move { db.version().await })),
    )
    .await
    {
        Ok(Ok(_)) => ServiceHealthStatus::healthy().with_response_time(start.elapsed().as_millis() as u64),
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(e.to_string()),
        Err(_) => ServiceHealthStatus::unhealthy("Data source check timed out".to_string()),
    }
}

#[derive(Serialize)]
struct DetailedHealthResponse {
    status: String,
    timestamp: i64,
    version: &'static str,
    services: ServicesHealth,
}

#[derive(Serialize)]
struct ServicesHealth {
    data_source: ServiceHealthStatus,
}

pub async fn detailed_health_check_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> HttpResponse {
    let data_source = check_data_source(gateway.get_ref()).await;
    let healthy = data_source.is_healthy();

    let response = DetailedHealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        timestamp: Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION"),
        services: ServicesHealth { data_source },
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "health",
    responses(
        (status = 200, description = "The database answers"),
        (status = 503, description = "The database is unreachable or not configured")
    )
)]
#[get("/health/detailed")]
pub async fn detailed_health_check(gateway: web::Data<Gateway<SurrealConnector>>) -> HttpResponse {
    detailed_health_check_impl(gateway).await
}
