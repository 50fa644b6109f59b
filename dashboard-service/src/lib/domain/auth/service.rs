use std::sync::Arc;

use auth::AuthenticationError;
use auth::Authenticator;
use auth::IdentityProvider;
use auth::Permissions;
use auth::Role;
use auth::SessionClaims;
use chrono::Duration;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::CurrentUser;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::credentials::errors::CredentialStoreError;
use crate::domain::credentials::ports::CredentialBackend;
use crate::domain::directory::ports::DirectoryAuthenticator;

/// Orchestrates login across the local admin identity and the optional
/// directory, and issues session tokens.
pub struct AuthService {
    authenticator: Arc<Authenticator>,
    credentials: CredentialBackend,
    directory: Option<Arc<dyn DirectoryAuthenticator>>,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a new auth service.
    ///
    /// # Arguments
    /// * `authenticator` - Hasher and token codec bound to the signing secret
    /// * `credentials` - Store holding the local admin identity
    /// * `directory` - Optional external directory
    /// * `session_ttl` - Lifetime of issued session tokens
    pub fn new(
        authenticator: Arc<Authenticator>,
        credentials: CredentialBackend,
        directory: Option<Arc<dyn DirectoryAuthenticator>>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            authenticator,
            credentials,
            directory,
            session_ttl,
        }
    }

    /// Authenticate and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No identity source accepted the credentials
    /// * `Configuration` - Local admin fields are missing from the store
    /// * `Internal` - Token signing failed
    pub async fn login(&self, command: &LoginCommand) -> Result<LoginOutcome, AuthError> {
        if command.username.is_empty() || command.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        match command.identity_provider {
            Some(IdentityProvider::Core) => {
                self.login_core(&command.username, &command.password).await
            }
            Some(IdentityProvider::Ldap) => {
                self.login_directory(&command.username, &command.password)
                    .await
            }
            None => match self.login_core(&command.username, &command.password).await {
                Err(AuthError::InvalidCredentials) if self.directory.is_some() => {
                    self.login_directory(&command.username, &command.password)
                        .await
                }
                result => result,
            },
        }
    }

    /// Validate a presented session token.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is invalid or expired
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.authenticator.validate_session(token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AuthError::Unauthorized
        })
    }

    /// Hash a new admin password.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.authenticator
            .hash_password(password)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Read the caller from claims attached by the session gate.
    ///
    /// # Errors
    /// * `Unauthorized` - No validated claims accompany the request
    pub fn get_current_user(claims: Option<&SessionClaims>) -> Result<CurrentUser, AuthError> {
        claims.map(CurrentUser::from).ok_or(AuthError::Unauthorized)
    }

    async fn login_core(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let admin_username = self
            .credentials
            .admin_username()
            .await
            .map_err(classify_store_error)?;
        let password_hash = self
            .credentials
            .admin_password_hash()
            .await
            .map_err(classify_store_error)?;

        if username != admin_username {
            return Err(AuthError::InvalidCredentials);
        }

        self.authenticator
            .verify_password(password, &password_hash)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
                AuthenticationError::PasswordError(err) => {
                    tracing::warn!(error = %err, "Stored admin password hash is unusable");
                    AuthError::InvalidCredentials
                }
                AuthenticationError::JwtError(err) => AuthError::Internal(err.to_string()),
            })?;

        self.issue(username, Role::Admin, IdentityProvider::Core, None)
    }

    async fn login_directory(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let Some(directory) = self.directory.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = directory.authenticate(username, password).await {
            tracing::debug!(error = %e, "Directory authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        if let Err(e) = directory.validate_required_group(username).await {
            tracing::debug!(error = %e, "Directory required group check failed");
            return Err(AuthError::InvalidCredentials);
        }

        let permissions = match directory.get_permissions(username).await {
            Ok(permissions) => permissions,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to resolve directory permissions; granting no namespaces"
                );
                Some(Permissions::new())
            }
        };

        let role = match &permissions {
            None => Role::Admin,
            Some(map) if map.is_empty() => Role::User,
            Some(_) => {
                if is_directory_admin(directory, username).await {
                    Role::Admin
                } else {
                    Role::User
                }
            }
        };

        self.issue(username, role, IdentityProvider::Ldap, permissions)
    }

    fn issue(
        &self,
        username: &str,
        role: Role,
        idp: IdentityProvider,
        permissions: Option<Permissions>,
    ) -> Result<LoginOutcome, AuthError> {
        let issued = self
            .authenticator
            .issue_session(username, role, idp, permissions.clone(), self.session_ttl)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        tracing::info!(username = %username, role = %role, idp = %idp, "Login succeeded");

        Ok(LoginOutcome {
            username: username.to_string(),
            role,
            identity_provider: idp,
            permissions,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

/// Whether any of the user's groups is a configured admin group.
async fn is_directory_admin(directory: &dyn DirectoryAuthenticator, username: &str) -> bool {
    let groups = match directory.get_groups(username).await {
        Ok(groups) => groups,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read directory groups");
            return false;
        }
    };
    let config = match directory.get_config().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read directory config");
            return false;
        }
    };

    groups.iter().any(|group| config.is_admin_group(group))
}

fn classify_store_error(err: CredentialStoreError) -> AuthError {
    match err {
        CredentialStoreError::NotConfigured(field) => AuthError::Configuration(field),
        other => {
            tracing::warn!(error = %other, "Credential store read failed during login");
            AuthError::InvalidCredentials
        }
    }
}
