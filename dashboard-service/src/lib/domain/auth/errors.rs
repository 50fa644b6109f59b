use thiserror::Error;

/// Failures surfaced by the auth service.
///
/// `InvalidCredentials` is deliberately uniform: callers cannot tell a wrong
/// username from a wrong password, a failed group check or a disabled
/// directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
