use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid connection settings: {0}")]
    Config(String),
    #[error("cannot connect to document store: {0}")]
    Connection(String),
    #[error("document store ping failed: {0}")]
    Ping(String),
    #[error("document encoding error: {0}")]
    Encode(String),
}
