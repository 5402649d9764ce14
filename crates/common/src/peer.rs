//! Outbound client for the peer user service.
//!
//! The account service pings the user service once after startup; the result
//! is only logged and never gates request handling.

use std::time::Duration;

use tracing::{info, warn};

use crate::CoreError;

/// `GET {base_url}/ping` and return the response body.
pub async fn ping_user_service(base_url: &str, timeout: Duration) -> Result<String, CoreError> {
    let url = format!("{}/ping", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CoreError::Network(e.to_string()))?;
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| CoreError::Network(e.to_string()))?
        .error_for_status()
        .map_err(|e| CoreError::Network(e.to_string()))?;
    resp.text().await.map_err(|e| CoreError::Parse(e.to_string()))
}

/// Fire-and-forget variant used at startup.
pub fn spawn_ping(base_url: String, timeout: Duration) {
    tokio::spawn(async move {
        match ping_user_service(&base_url, timeout).await {
            Ok(body) => info!(peer = %base_url, response = %body, "peer ping succeeded"),
            Err(e) => warn!(peer = %base_url, error = %e, "peer ping failed"),
        }
    });
}
