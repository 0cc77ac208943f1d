// common/src/error.rs
use thiserror::Error;

/// Failures surfaced by the document stores and the message log
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of the token service and password hasher
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}
