use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use tracing::{debug, info};

use crate::errors::ModelError;

/// Handle to the document store, created once at startup and cloned into
/// every component that needs it. `Client` is internally pooled.
#[derive(Clone, Debug)]
pub struct MongoDb {
    pub client: Client,
    pub database: Database,
    ping_timeout: Duration,
}

impl MongoDb {
    /// Liveness check against the configured database.
    pub async fn ping(&self) -> Result<(), ModelError> {
        let ping = async { self.database.run_command(doc! { "ping": 1 }).await };
        match tokio::time::timeout(self.ping_timeout, ping).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ModelError::Ping(e.to_string())),
            Err(_) => Err(ModelError::Ping(format!("no reply within {:?}", self.ping_timeout))),
        }
    }
}

/// Connect and verify the connection with a `ping`.
///
/// Any failure here is meant to abort startup: the service must not accept
/// traffic without a usable store.
pub async fn connect(cfg: &DatabaseConfig) -> Result<MongoDb, ModelError> {
    cfg.validate().map_err(|e| ModelError::Config(e.to_string()))?;

    let connect_timeout = Duration::from_secs(cfg.connect_timeout_secs);
    let mut options = ClientOptions::parse(cfg.connection_uri())
        .await
        .map_err(|e| ModelError::Config(e.to_string()))?;
    options.app_name = Some(cfg.app_name.clone());
    options.connect_timeout = Some(connect_timeout);
    options.server_selection_timeout = Some(connect_timeout);

    let client = Client::with_options(options).map_err(|e| ModelError::Connection(e.to_string()))?;
    let db = MongoDb {
        database: client.database(&cfg.name),
        client,
        ping_timeout: connect_timeout,
    };
    debug!(database = %cfg.name, "mongodb client created, pinging");
    db.ping().await?;
    info!(database = %cfg.name, "connected to mongodb");
    Ok(db)
}
