use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format: {0}")]
    MalformedHash(String),

    #[error("Unsupported hash variant: {0}")]
    UnsupportedVariant(String),

    #[error("Incompatible argon2 version: {0}")]
    IncompatibleVersion(String),

    #[error("Invalid hash parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid base64 in password hash: {0}")]
    InvalidEncoding(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
