use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub peer: PeerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// MongoDB connection settings.
///
/// Either `uri` is given verbatim, or it is assembled from the individual
/// parts (see [`DatabaseConfig::connection_uri`]).
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub is_atlas: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            is_atlas: false,
            user: String::new(),
            password: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            connect_timeout_secs: default_connect_timeout(),
            operation_timeout_secs: default_operation_timeout(),
            app_name: default_app_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    #[serde(default)]
    pub user_service_url: Option<String>,
    #[serde(default = "default_peer_timeout")]
    pub timeout_secs: u64,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self { user_service_url: None, timeout_secs: default_peer_timeout() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 4300 }
fn default_request_timeout() -> u64 { 30 }
fn default_db_host() -> String { "localhost".into() }
fn default_db_port() -> u16 { 27017 }
fn default_db_name() -> String { "account_service".into() }
fn default_connect_timeout() -> u64 { 10 }
fn default_operation_timeout() -> u64 { 10 }
fn default_app_name() -> String { "account-service".into() }
fn default_peer_timeout() -> u64 { 5 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), fall back to defaults when the
    /// file is missing, then apply the environment and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.normalize_with(|key| std::env::var(key).ok())
    }

    /// Same as [`normalize_and_validate`](Self::normalize_and_validate) with an
    /// explicit variable lookup.
    pub fn normalize_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.apply_env(&lookup)?;
        self.server.validate()?;
        self.database.apply_env(&lookup)?;
        self.database.validate()?;
        self.peer.apply_env(&lookup);
        self.peer.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn non_blank<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) -> Result<()> {
        if let Some(host) = non_blank(lookup, "SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = non_blank(lookup, "SERVER_PORT") {
            self.port = port.trim().parse().map_err(|_| anyhow!("SERVER_PORT is not a valid port: {port}"))?;
        }
        if let Some(w) = non_blank(lookup, "TOKIO_WORKER_THREADS") {
            self.worker_threads = w.trim().parse().ok();
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("server.request_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) -> Result<()> {
        if let Some(uri) = non_blank(lookup, "MONGO_DB_URI") {
            self.uri = uri;
        }
        if let Some(atlas) = non_blank(lookup, "IS_MONGO_ATLAS") {
            self.is_atlas = atlas.trim().eq_ignore_ascii_case("true");
        }
        if let Some(user) = non_blank(lookup, "MONGO_DB_USER") {
            self.user = user;
        }
        if let Some(password) = non_blank(lookup, "MONGO_DB_PASSWORD") {
            self.password = password;
        }
        if let Some(host) = non_blank(lookup, "MONGO_DB_HOST") {
            self.host = host;
        }
        if let Some(port) = non_blank(lookup, "MONGO_DB_PORT") {
            self.port = port.trim().parse().map_err(|_| anyhow!("MONGO_DB_PORT is not a valid port: {port}"))?;
        }
        if let Some(name) = non_blank(lookup, "MONGO_DATABASE") {
            self.name = name;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("database.name is empty; set it in config.toml or MONGO_DATABASE"));
        }
        let uri = self.connection_uri();
        if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database uri must start with mongodb:// or mongodb+srv://"));
        }
        if self.uri.trim().is_empty() && self.host.trim().is_empty() {
            return Err(anyhow!("database.host is empty"));
        }
        if !self.is_atlas && self.uri.trim().is_empty() && self.port == 0 {
            return Err(anyhow!("database.port must be in 1..=65535"));
        }
        if self.connect_timeout_secs == 0 || self.operation_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive numbers of seconds"));
        }
        Ok(())
    }

    /// Connection string handed to the driver.
    pub fn connection_uri(&self) -> String {
        if !self.uri.trim().is_empty() {
            return self.uri.trim().to_string();
        }
        let credentials = if self.user.is_empty() {
            String::new()
        } else {
            format!("{}:{}@", self.user, self.password)
        };
        if self.is_atlas {
            format!(
                "mongodb+srv://{}{}/{}?retryWrites=true&w=majority",
                credentials, self.host, self.name
            )
        } else {
            format!("mongodb://{}{}:{}", credentials, self.host, self.port)
        }
    }
}

impl PeerConfig {
    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if let Some(url) = non_blank(lookup, "USER_SERVICE_URL") {
            self.user_service_url = Some(url);
        }
        if matches!(self.user_service_url.as_deref(), Some(u) if u.trim().is_empty()) {
            self.user_service_url = None;
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.user_service_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("peer.user_service_url must start with http:// or https://"));
            }
            if self.timeout_secs == 0 {
                return Err(anyhow!("peer.timeout_secs must be a positive number of seconds"));
            }
        }
        Ok(())
    }
}
