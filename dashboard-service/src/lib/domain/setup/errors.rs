use thiserror::Error;

use crate::domain::credentials::errors::CredentialStoreError;

/// Errors raised by the first-run setup flow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("{0}")]
    Validation(String),

    #[error("Setup already completed")]
    AlreadyConfigured,

    /// The operation is only available while setup is required.
    #[error("Not in setup mode")]
    NotInSetup,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Setup unavailable: {0}")]
    Configuration(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CredentialStoreError> for SetupError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::AlreadyExists | CredentialStoreError::AlreadyConfigured => {
                SetupError::AlreadyConfigured
            }
            CredentialStoreError::PermissionDenied(msg) => SetupError::PermissionDenied(msg),
            CredentialStoreError::InvalidValue(msg) => SetupError::Validation(msg),
            CredentialStoreError::NotConfigured(msg)
            | CredentialStoreError::UntrustedTransport(msg) => SetupError::Configuration(msg),
            other => SetupError::Store(other.to_string()),
        }
    }
}
