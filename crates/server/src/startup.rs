use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use service::account::repo::MongoAccountRepository;
use service::account::repository::AccountRepository;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {e}", server.host, server.port)))
}

/// Wire an application around an existing repository.
pub fn build_app(repo: Arc<dyn AccountRepository>, cfg: &AppConfig) -> Router {
    let state = ServerState::new(repo);
    routes::build_router(state, build_cors(), Duration::from_secs(cfg.server.request_timeout_secs))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
    }
}

/// Public entry: connect the store, build the app and serve until Ctrl+C.
///
/// A store that cannot be reached or does not answer `ping` aborts startup.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let db = models::db::connect(&cfg.database).await?;
    let repo = MongoAccountRepository::new(&db, Duration::from_secs(cfg.database.operation_timeout_secs));
    let app = build_app(Arc::new(repo), &cfg);

    if let Some(url) = cfg.peer.user_service_url.clone() {
        common::peer::spawn_ping(url, Duration::from_secs(cfg.peer.timeout_secs));
    }

    let addr = bind_addr(&cfg.server)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "account service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
