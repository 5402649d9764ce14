//! HTTP handlers for `/v1/accounts`.
//!
//! Bodies are decoded strictly into [`Account`]; any decoding failure becomes
//! a 422. Domain errors are mapped to status codes by [`ApiError`].

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use service::account::domain::Account;
use tracing::{info, instrument, Span};

use crate::{errors::ApiError, routes::ServerState};

#[utoipa::path(
    post, path = "/v1/accounts", tag = "accounts",
    request_body = crate::openapi::AccountDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::AccountDoc),
        (status = 422, description = "Malformed Input", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<Account>, JsonRejection>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let Json(input) = payload?;
    if !input.id.is_empty() {
        return Err(ApiError::MalformedInput("id is assigned by the server and must not be supplied".into()));
    }
    let account = state.accounts.create(input).await?;
    info!(id = %account.id, "account created");
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    get, path = "/v1/accounts", tag = "accounts",
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::AccountDoc]),
        (status = 500, description = "Store Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.accounts.list().await?;
    info!(count = accounts.len(), "list accounts");
    Ok(Json(accounts))
}

#[utoipa::path(
    get, path = "/v1/accounts/{id}", tag = "accounts",
    params(("id" = String, Path, description = "Account id (24 hex characters)")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::AccountDoc),
        (status = 400, description = "Invalid Identifier", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store Error", body = crate::openapi::ErrorDoc)
    )
)]
#[instrument(name = "fetch_account", skip(state), fields(account.id = tracing::field::Empty))]
pub async fn fetch(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let account = state.accounts.fetch(&id).await?;
    Span::current().record("account.id", account.id.as_str());
    Ok(Json(account))
}

#[utoipa::path(
    put, path = "/v1/accounts/{id}", tag = "accounts",
    params(("id" = String, Path, description = "Account id (24 hex characters)")),
    request_body = crate::openapi::AccountDoc,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid Identifier or id mismatch", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Update Failed", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Malformed Input", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<Account>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(input) = payload?;
    state.accounts.update(&id, input).await?;
    info!(%id, "account updated");
    Ok(StatusCode::NO_CONTENT)
}
