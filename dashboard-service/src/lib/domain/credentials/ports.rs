use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::credentials::errors::CredentialStoreError;
use crate::domain::credentials::models::NewCredentials;
use crate::domain::credentials::models::StoredCredentials;

/// Read access to the local admin identity.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve the admin username.
    ///
    /// # Errors
    /// * `NotConfigured` - No username is stored
    /// * `PermissionDenied` / `Cluster` - Backing store could not be read
    async fn admin_username(&self) -> Result<String, CredentialStoreError>;

    /// Retrieve the encoded admin password hash.
    ///
    /// # Errors
    /// * `NotConfigured` - No hash is stored
    /// * `PermissionDenied` / `Cluster` - Backing store could not be read
    async fn admin_password_hash(&self) -> Result<String, CredentialStoreError>;
}

/// Credential store backed by a cluster secret.
///
/// Only this variant can bootstrap and rotate credentials.
#[async_trait]
pub trait ClusterCredentialStore: CredentialStore {
    /// Whether the credential secret exists.
    ///
    /// # Returns
    /// `false` when the secret is absent or no cluster client is available yet
    ///
    /// # Errors
    /// * `PermissionDenied` / `Cluster` - Existence could not be determined
    async fn secret_exists(&self) -> Result<bool, CredentialStoreError>;

    /// Read every stored field, `None` when the secret does not exist.
    async fn read_credentials(&self) -> Result<Option<StoredCredentials>, CredentialStoreError>;

    /// Create the secret with all four fields.
    ///
    /// # Errors
    /// * `InvalidValue` - Signing secret shorter than 32 bytes
    /// * `AlreadyExists` - Secret already exists
    /// * `PermissionDenied` - Access token may not write the secret
    async fn create(&self, credentials: &NewCredentials) -> Result<(), CredentialStoreError>;

    /// Create the secret, or complete an existing one in place.
    ///
    /// # Errors
    /// * `InvalidValue` - Signing secret shorter than 32 bytes
    /// * `PermissionDenied` - Access token may not read or write the secret
    async fn create_or_update(
        &self,
        credentials: &NewCredentials,
    ) -> Result<(), CredentialStoreError>;

    /// Replace only the admin password hash.
    ///
    /// # Errors
    /// * `NotFound` - Secret does not exist
    async fn update_password(&self, password_hash: &str) -> Result<(), CredentialStoreError>;

    /// Replace only the service access token, authenticating the write with
    /// `access_token` itself.
    ///
    /// # Errors
    /// * `InvalidValue` - Token is empty
    /// * `PermissionDenied` - The new token may not write the secret
    /// * `UntrustedTransport` - No acceptable trust anchor for the cluster API
    async fn update_access_token(&self, access_token: &str) -> Result<(), CredentialStoreError>;
}

/// The credential store the service runs with.
#[derive(Clone)]
pub enum CredentialBackend {
    Environment(Arc<dyn CredentialStore>),
    Cluster(Arc<dyn ClusterCredentialStore>),
}

impl CredentialBackend {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialBackend::Environment(_) => "environment",
            CredentialBackend::Cluster(_) => "cluster",
        }
    }

    /// The rotation-capable store, if this backend has one.
    pub fn cluster(&self) -> Option<&Arc<dyn ClusterCredentialStore>> {
        match self {
            CredentialBackend::Environment(_) => None,
            CredentialBackend::Cluster(store) => Some(store),
        }
    }

    pub async fn admin_username(&self) -> Result<String, CredentialStoreError> {
        match self {
            CredentialBackend::Environment(store) => store.admin_username().await,
            CredentialBackend::Cluster(store) => store.admin_username().await,
        }
    }

    pub async fn admin_password_hash(&self) -> Result<String, CredentialStoreError> {
        match self {
            CredentialBackend::Environment(store) => store.admin_password_hash().await,
            CredentialBackend::Cluster(store) => store.admin_password_hash().await,
        }
    }
}
