pub mod accounts;
pub mod actuator;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    BoxError, Router,
};
use service::account::{repository::AccountRepository, AccountService};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{errors::ApiError, openapi};

/// Shared handler state. Cloned per request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct ServerState {
    pub accounts: Arc<AccountService<dyn AccountRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { accounts: Arc::new(AccountService::new(repo)) }
    }
}

/// Count every routed request by method, matched path and status.
async fn track_requests(path: MatchedPath, req: Request, next: Next) -> Response {
    let operation = format!("{} {}", req.method(), path.as_str());
    let response = next.run(req).await;
    common::metrics::record_request(&operation, response.status().as_u16());
    response
}

/// Render failures of the middleware stack in the API's error shape.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Build the full application router: the versioned account API plus the
/// actuator, metrics and OpenAPI endpoints.
pub fn build_router(state: ServerState, cors: CorsLayer, request_timeout: Duration) -> Router {
    let v1 = Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/:id", get(accounts::fetch).put(accounts::update));

    Router::new()
        .nest("/v1", v1)
        .route("/metrics", get(actuator::metrics))
        .route("/actuator/ping", get(actuator::ping))
        .route("/actuator/health", get(actuator::health))
        .route("/actuator/info", get(actuator::info))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .route_layer(middleware::from_fn(track_requests))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
