use thiserror::Error;

/// Classified failures of account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("objectID is invalid: {0}")]
    InvalidId(String),
    #[error("account {0} does not exist")]
    NotFound(String),
    #[error("id({path}) and payload({payload}) don't match")]
    Mismatch { path: String, payload: String },
    #[error("update of account {0} had no effect")]
    UpdateFailed(String),
    #[error("store error: {0}")]
    Store(String),
}

impl AccountError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AccountError::InvalidId(_) => 2001,
            AccountError::NotFound(_) => 2002,
            AccountError::Mismatch { .. } => 2003,
            AccountError::UpdateFailed(_) => 2004,
            AccountError::Store(_) => 2100,
        }
    }
}
