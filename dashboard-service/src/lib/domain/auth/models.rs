use auth::IdentityProvider;
use auth::Permissions;
use auth::Role;
use auth::SessionClaims;
use chrono::DateTime;
use chrono::Utc;

/// Login request after HTTP parsing.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
    /// Restrict login to one identity source; `None` tries core, then ldap.
    pub identity_provider: Option<IdentityProvider>,
}

impl LoginCommand {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        identity_provider: Option<IdentityProvider>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            identity_provider,
        }
    }
}

impl std::fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .field("identity_provider", &self.identity_provider)
            .finish_non_exhaustive()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub username: String,
    pub role: Role,
    pub identity_provider: IdentityProvider,
    pub permissions: Option<Permissions>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity of the caller, read from validated session claims.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
    pub identity_provider: IdentityProvider,
    pub permissions: Option<Permissions>,
}

impl From<&SessionClaims> for CurrentUser {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            username: claims.username.clone(),
            role: claims.role,
            identity_provider: claims.idp,
            permissions: claims.permissions.clone(),
        }
    }
}
