use async_trait::async_trait;
use auth::Permissions;

use crate::domain::directory::errors::DirectoryError;
use crate::domain::directory::models::DirectoryConfig;

/// External directory (LDAP) used as a second identity source.
///
/// The wire protocol lives outside this crate; the service only depends on
/// this contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryAuthenticator: Send + Sync + 'static {
    /// Bind as `username` with `password`.
    async fn authenticate(&self, username: &str, password: &str) -> Result<(), DirectoryError>;

    /// Namespace permissions derived from the user's groups.
    ///
    /// # Returns
    /// `None` for unrestricted (administrative) scope, `Some` of an empty map
    /// for an identity with no namespace access.
    async fn get_permissions(&self, username: &str)
        -> Result<Option<Permissions>, DirectoryError>;

    /// Check membership of the configured required group.
    async fn validate_required_group(&self, username: &str) -> Result<(), DirectoryError>;

    async fn get_groups(&self, username: &str) -> Result<Vec<String>, DirectoryError>;

    async fn get_config(&self) -> Result<DirectoryConfig, DirectoryError>;
}
