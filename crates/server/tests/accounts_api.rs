use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::account::domain::Account;
use service::account::errors::AccountError;
use service::account::repository::{memory::InMemoryAccountRepository, AccountRepository};
use tower::ServiceExt;

use server::routes::{build_router, ServerState};
use server::startup::build_app;
use tower_http::cors::CorsLayer;

fn app_with(repo: Arc<dyn AccountRepository>) -> Router {
    build_app(repo, &configs::AppConfig::default())
}

fn app() -> (Arc<InMemoryAccountRepository>, Router) {
    let repo = Arc::new(InMemoryAccountRepository::new());
    (repo.clone(), app_with(repo))
}

fn json_request(method: &str, uri: &str, body: &Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn get(uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method("GET").uri(uri).body(Body::empty())?)
}

async fn send_raw(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Vec<u8>)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let (status, bytes) = send_raw(app, req).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

async fn create_alice(app: &Router) -> anyhow::Result<String> {
    let (status, body) = send(
        app,
        json_request("POST", "/v1/accounts", &json!({"accountNumber": "A1", "city": "NYC", "name": "Alice"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(body["id"].as_str().expect("id in create response").to_string())
}

#[tokio::test]
async fn create_fetch_update_scenario() -> anyhow::Result<()> {
    let (_, app) = app();

    let id = create_alice(&app).await?;
    assert_eq!(id.len(), 24);

    let (status, body) = send(&app, get(&format!("/v1/accounts/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "accountNumber": "A1", "city": "NYC", "name": "Alice"}));

    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/v1/accounts/{id}"), &json!({"id": id, "city": "LA"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, get(&format!("/v1/accounts/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city"], "LA");
    assert_eq!(body["accountNumber"], "A1");
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["id"], id.as_str());
    Ok(())
}

#[tokio::test]
async fn list_is_an_array_even_when_empty() -> anyhow::Result<()> {
    let (_, app) = app();

    let (status, body) = send(&app, get("/v1/accounts")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let first = create_alice(&app).await?;
    let second = create_alice(&app).await?;
    let (_, body) = send(&app, get("/v1/accounts")?).await?;
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|a| a["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    Ok(())
}

#[tokio::test]
async fn create_rejects_malformed_bodies_with_422() -> anyhow::Result<()> {
    let (repo, app) = app();

    let bodies = [
        json!({"accountNumber": "A1", "balance": 100}),
        json!({"name": 42}),
        json!(["Alice"]),
        json!({"id": "64b7f0c2e1a2b3c4d5e6f7a8", "name": "Alice"}),
    ];
    for body in bodies {
        let (status, resp) = send(&app, json_request("POST", "/v1/accounts", &body)?).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert!(resp["error"].is_string(), "{resp}");
    }

    let req = Request::builder()
        .method("POST")
        .uri("/v1/accounts")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let (status, resp) = send(&app, req).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp["error"].is_string());

    let req = Request::builder().method("POST").uri("/v1/accounts").body(Body::from("{}"))?;
    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(repo.store_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn fetch_maps_identifier_errors() -> anyhow::Result<()> {
    let (_, app) = app();

    let (status, body) = send(&app, get("/v1/accounts/not-an-id")?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "objectID is invalid: not-an-id"}));

    let (status, body) = send(&app, get("/v1/accounts/64b7f0c2e1a2b3c4d5e6f7a8")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "account 64b7f0c2e1a2b3c4d5e6f7a8 does not exist"}));
    Ok(())
}

#[tokio::test]
async fn update_error_mapping() -> anyhow::Result<()> {
    let (repo, app) = app();
    let id = create_alice(&app).await?;

    let calls = repo.store_calls();
    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/v1/accounts/{id}"), &json!({"id": "64b7f0c2e1a2b3c4d5e6f7a8", "city": "LA"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("don't match"));
    assert_eq!(repo.store_calls(), calls);

    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/v1/accounts/{id}"), &json!({"id": id, "city": 7}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, json_request("PUT", "/v1/accounts/xyz", &json!({"id": "xyz"}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = "64b7f0c2e1a2b3c4d5e6f7a8";
    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/v1/accounts/{missing}"), &json!({"id": missing, "city": "LA"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn store_failures_are_500() -> anyhow::Result<()> {
    let (repo, app) = app();
    repo.set_offline(true);

    let (status, body) = send(&app, get("/v1/accounts")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "store error: store unavailable"}));

    let (status, _) = send(&app, json_request("POST", "/v1/accounts", &json!({"name": "Alice"}))?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, get("/v1/accounts/64b7f0c2e1a2b3c4d5e6f7a8")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn update_that_changes_nothing_is_409() -> anyhow::Result<()> {
    let (_, app) = app();
    let id = create_alice(&app).await?;

    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/v1/accounts/{id}"), &json!({"id": id, "city": "NYC"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": format!("update of account {id} had no effect")}));

    let (status, _) = send(&app, json_request("PUT", &format!("/v1/accounts/{id}"), &json!({"id": id}))?).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, get(&format!("/v1/accounts/{id}"))?).await?;
    assert_eq!(body, json!({"id": id, "accountNumber": "A1", "city": "NYC", "name": "Alice"}));
    Ok(())
}

/// Repository whose documents disappear between the read and the write of an update.
struct VanishingRepository;

#[async_trait::async_trait]
impl AccountRepository for VanishingRepository {
    async fn create(&self, _account: Account) -> Result<Account, AccountError> {
        Err(AccountError::Store("read-only".into()))
    }

    async fn list(&self) -> Result<Vec<Account>, AccountError> {
        Ok(Vec::new())
    }

    async fn fetch(&self, id: &str) -> Result<Account, AccountError> {
        Ok(Account { id: id.to_string(), ..Default::default() })
    }

    async fn update(&self, id: &str, _account: Account) -> Result<(), AccountError> {
        Err(AccountError::UpdateFailed(id.to_string()))
    }
}

#[tokio::test]
async fn update_without_effect_is_409() -> anyhow::Result<()> {
    let app = app_with(Arc::new(VanishingRepository));
    let id = "64b7f0c2e1a2b3c4d5e6f7a8";
    let (status, body) = send(
        &app,
        json_request("PUT", &format!("/v1/accounts/{id}"), &json!({"id": id, "city": "LA"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": format!("update of account {id} had no effect")}));
    Ok(())
}

/// Repository that never answers within a short request deadline.
struct SlowRepository;

#[async_trait::async_trait]
impl AccountRepository for SlowRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        Ok(account)
    }

    async fn list(&self) -> Result<Vec<Account>, AccountError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }

    async fn fetch(&self, id: &str) -> Result<Account, AccountError> {
        Err(AccountError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, _account: Account) -> Result<(), AccountError> {
        Err(AccountError::NotFound(id.to_string()))
    }
}

#[tokio::test]
async fn request_deadline_answers_408_with_error_body() -> anyhow::Result<()> {
    let app = build_router(
        ServerState::new(Arc::new(SlowRepository)),
        CorsLayer::very_permissive(),
        Duration::from_millis(50),
    );
    let (status, body) = send(&app, get("/v1/accounts")?).await?;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"error": "request timed out"}));
    Ok(())
}

#[tokio::test]
async fn actuator_metrics_and_openapi() -> anyhow::Result<()> {
    let (_, app) = app();

    let (status, bytes) = send_raw(&app, get("/actuator/ping")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.is_empty());

    let (status, body) = send(&app, get("/actuator/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(&app, get("/actuator/info")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "account-service");

    let _ = send(&app, get("/v1/accounts")?).await?;
    let (status, bytes) = send_raw(&app, get("/metrics")?).await?;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes)?;
    assert!(text.contains("account_service_requests_total"));
    assert!(text.contains("GET /v1/accounts"));

    let (status, body) = send(&app, get("/api-docs/openapi.json")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/v1/accounts"].is_object());
    assert!(body["paths"]["/v1/accounts/{id}"]["put"].is_object());
    assert!(body["paths"]["/actuator/ping"]["get"].is_object());
    Ok(())
}
