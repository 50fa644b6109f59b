use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Namespace name to permission level (e.g. `"view"`, `"edit"`).
pub type Permissions = HashMap<String, String>;

/// Role granted to an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which authentication method validated the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    /// Local admin identity from the credential store.
    Core,
    /// External directory service.
    Ldap,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Core => "core",
            IdentityProvider::Ldap => "ldap",
        }
    }
}

impl fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(IdentityProvider::Core),
            "ldap" => Ok(IdentityProvider::Ldap),
            other => Err(format!("unknown identity provider: {}", other)),
        }
    }
}

/// Claims carried by a dashboard session token.
///
/// `permissions` keeps the three-way distinction callers rely on:
/// `None` is unrestricted access, `Some` of an empty map is an authenticated
/// identity with no namespaces, anything else is an explicit allow-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub username: String,
    pub role: Role,
    pub idp: IdentityProvider,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl SessionClaims {
    /// Create claims issued now and expiring after `ttl`.
    pub fn new(
        username: impl Into<String>,
        role: Role,
        idp: IdentityProvider,
        permissions: Option<Permissions>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            username: username.into(),
            role,
            idp,
            permissions,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Expiration as a UTC instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims_lifetime() {
        let claims = SessionClaims::new(
            "admin",
            Role::Admin,
            IdentityProvider::Core,
            None,
            Duration::hours(24),
        );

        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_is_expired() {
        let claims = SessionClaims::new("u", Role::User, IdentityProvider::Ldap, None, Duration::zero())
            .with_expiration(1000);

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_permissions_nil_and_empty_are_distinct_on_the_wire() {
        let unrestricted =
            SessionClaims::new("a", Role::Admin, IdentityProvider::Core, None, Duration::hours(1));
        let restricted = SessionClaims::new(
            "b",
            Role::User,
            IdentityProvider::Ldap,
            Some(Permissions::new()),
            Duration::hours(1),
        );

        let unrestricted_json = serde_json::to_value(&unrestricted).unwrap();
        let restricted_json = serde_json::to_value(&restricted).unwrap();
        assert!(unrestricted_json.get("permissions").is_none());
        assert_eq!(restricted_json["permissions"], serde_json::json!({}));

        let decoded: SessionClaims = serde_json::from_value(restricted_json).unwrap();
        assert_eq!(decoded.permissions, Some(Permissions::new()));
        let decoded: SessionClaims = serde_json::from_value(unrestricted_json).unwrap();
        assert_eq!(decoded.permissions, None);
    }

    #[test]
    fn test_role_and_idp_wire_names() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(IdentityProvider::Ldap).unwrap(), "ldap");
        assert_eq!("core".parse::<IdentityProvider>(), Ok(IdentityProvider::Core));
        assert!("saml".parse::<IdentityProvider>().is_err());
    }
}
