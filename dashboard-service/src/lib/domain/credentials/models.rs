use std::fmt;

use auth::jwt::MIN_SECRET_LENGTH;

use crate::domain::credentials::errors::CredentialStoreError;

/// Secret data keys. These names are part of the persisted contract.
pub const ADMIN_USERNAME_KEY: &str = "admin-username";
pub const ADMIN_PASSWORD_HASH_KEY: &str = "admin-password-hash";
pub const JWT_SECRET_KEY: &str = "jwt-secret";
pub const SERVICE_ACCOUNT_TOKEN_KEY: &str = "service-account-token";

/// Fields currently present in the backing store.
///
/// Every field is optional: an externally provisioned secret may carry only
/// some of them (e.g. just the access token).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub admin_username: Option<String>,
    pub admin_password_hash: Option<String>,
    pub jwt_secret: Option<String>,
    pub service_account_token: Option<String>,
}

impl StoredCredentials {
    /// True once a non-empty admin username has been persisted.
    pub fn has_admin(&self) -> bool {
        self.admin_username
            .as_deref()
            .is_some_and(|username| !username.is_empty())
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("admin_username", &self.admin_username)
            .field("admin_password_hash", &self.admin_password_hash.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field(
                "service_account_token",
                &self.service_account_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// The complete record written during bootstrap.
#[derive(Clone, PartialEq, Eq)]
pub struct NewCredentials {
    pub username: String,
    pub password_hash: String,
    pub signing_secret: String,
    pub access_token: String,
}

impl NewCredentials {
    /// Build a record, enforcing the signing secret minimum length.
    ///
    /// # Errors
    /// * `InvalidValue` - Empty field or signing secret shorter than 32 bytes
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        signing_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CredentialStoreError> {
        let credentials = Self {
            username: username.into(),
            password_hash: password_hash.into(),
            signing_secret: signing_secret.into(),
            access_token: access_token.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Re-check invariants; stores call this before every write.
    pub fn validate(&self) -> Result<(), CredentialStoreError> {
        if self.signing_secret.len() < MIN_SECRET_LENGTH {
            return Err(CredentialStoreError::InvalidValue(format!(
                "signing secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if self.username.is_empty() {
            return Err(CredentialStoreError::InvalidValue(
                "admin username is empty".to_string(),
            ));
        }
        if self.password_hash.is_empty() {
            return Err(CredentialStoreError::InvalidValue(
                "admin password hash is empty".to_string(),
            ));
        }
        if self.access_token.is_empty() {
            return Err(CredentialStoreError::InvalidValue(
                "service account token is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// View this record as stored fields.
    pub fn to_stored(&self) -> StoredCredentials {
        StoredCredentials {
            admin_username: Some(self.username.clone()),
            admin_password_hash: Some(self.password_hash.clone()),
            jwt_secret: Some(self.signing_secret.clone()),
            service_account_token: Some(self.access_token.clone()),
        }
    }
}

impl fmt::Debug for NewCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_new_credentials_rejects_short_secret() {
        let result = NewCredentials::new("admin", "$argon2id$hash", "too-short", "token");
        assert!(matches!(result, Err(CredentialStoreError::InvalidValue(_))));
    }

    #[test]
    fn test_new_credentials_rejects_empty_token() {
        let result = NewCredentials::new("admin", "$argon2id$hash", SECRET, "");
        assert!(matches!(result, Err(CredentialStoreError::InvalidValue(_))));
    }

    #[test]
    fn test_has_admin() {
        let mut stored = StoredCredentials {
            service_account_token: Some("token".to_string()),
            ..Default::default()
        };
        assert!(!stored.has_admin());

        stored.admin_username = Some(String::new());
        assert!(!stored.has_admin());

        stored.admin_username = Some("admin".to_string());
        assert!(stored.has_admin());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = NewCredentials::new("admin", "$argon2id$hash", SECRET, "token").unwrap();
        let rendered = format!("{:?} {:?}", credentials, credentials.to_stored());

        assert!(rendered.contains("admin"));
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("$argon2id$hash"));
    }
}
