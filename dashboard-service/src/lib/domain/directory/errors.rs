use thiserror::Error;

/// Errors reported by a directory authenticator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Directory rejected the credentials")]
    InvalidCredentials,

    #[error("User is not a member of the required group")]
    MissingRequiredGroup,

    #[error("Directory lookup failed: {0}")]
    Lookup(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}
