#![cfg(test)]
use configs::DatabaseConfig;
use models::db::{connect, MongoDb};
use mongodb::bson::oid::ObjectId;

/// Connect to the test MongoDB named by `MONGODB_TEST_URI`, using a fresh
/// database per call. Returns `None` when no test store is configured.
pub async fn get_db() -> Result<Option<MongoDb>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(uri) = std::env::var("MONGODB_TEST_URI") else {
        eprintln!("skip: MONGODB_TEST_URI not set");
        return Ok(None);
    };
    let cfg = DatabaseConfig {
        uri,
        name: format!("account_service_test_{}", ObjectId::new().to_hex()),
        ..Default::default()
    };
    Ok(Some(connect(&cfg).await?))
}
