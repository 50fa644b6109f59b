use thiserror::Error;

/// Errors raised by credential store implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// A required field or environment variable is missing.
    #[error("Credential store not configured: {0}")]
    NotConfigured(String),

    #[error("Credential secret not found")]
    NotFound,

    #[error("Credential secret already exists")]
    AlreadyExists,

    /// The secret already holds an admin identity.
    #[error("Credential secret already configured")]
    AlreadyConfigured,

    /// The cluster rejected the request (401/403).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid credential value: {0}")]
    InvalidValue(String),

    /// Transport trust could not be established for an ephemeral client.
    #[error("Untrusted cluster transport: {0}")]
    UntrustedTransport(String),

    #[error("Cluster API error: {0}")]
    Cluster(String),
}

impl CredentialStoreError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CredentialStoreError::PermissionDenied(_))
    }
}
