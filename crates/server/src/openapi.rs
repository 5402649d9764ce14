use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Account as documented on the wire. Every field may be omitted.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountDoc {
    pub id: Option<String>,
    pub account_number: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::accounts::create,
        crate::routes::accounts::list,
        crate::routes::accounts::fetch,
        crate::routes::accounts::update,
        crate::routes::actuator::ping,
        crate::routes::actuator::health,
        crate::routes::actuator::info,
    ),
    components(schemas(AccountDoc, ErrorDoc)),
    tags(
        (name = "accounts", description = "Account management"),
        (name = "actuator", description = "Liveness and build info"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
