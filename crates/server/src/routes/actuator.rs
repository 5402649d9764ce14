use axum::{http::StatusCode, Json};
use common::types::{Health, ServiceInfo};

/// Liveness check; answers 200 with no body.
#[utoipa::path(get, path = "/actuator/ping", tag = "actuator", responses((status = 200, description = "Service is alive")))]
pub async fn ping() -> StatusCode {
    StatusCode::OK
}

#[utoipa::path(get, path = "/actuator/health", tag = "actuator", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/actuator/info", tag = "actuator", responses((status = 200, description = "Service name and version")))]
pub async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo { name: "account-service", version: env!("CARGO_PKG_VERSION") })
}

pub async fn metrics() -> (StatusCode, String) {
    common::metrics::encode_metrics()
}
