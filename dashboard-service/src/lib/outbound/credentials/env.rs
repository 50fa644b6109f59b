use std::env;

use async_trait::async_trait;

use crate::domain::credentials::errors::CredentialStoreError;
use crate::domain::credentials::ports::CredentialStore;

pub const ADMIN_USER_ENV: &str = "ADMIN_USER";
/// Holds an encoded hash, never a plaintext password.
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Admin identity read from process environment variables on every call.
pub struct EnvCredentialStore {
    username_var: String,
    password_var: String,
}

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self::with_variables(ADMIN_USER_ENV, ADMIN_PASSWORD_ENV)
    }

    pub fn with_variables(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    fn read(&self, name: &str) -> Result<String, CredentialStoreError> {
        match env::var(name) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(CredentialStoreError::NotConfigured(name.to_string())),
        }
    }
}

impl Default for EnvCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn admin_username(&self) -> Result<String, CredentialStoreError> {
        self.read(&self.username_var)
    }

    async fn admin_password_hash(&self) -> Result<String, CredentialStoreError> {
        self.read(&self.password_var)
    }
}

/// Signing secret supplied through `JWT_SECRET`, if any.
pub fn env_signing_secret() -> Option<String> {
    env::var(JWT_SECRET_ENV).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_variables_are_not_configured() {
        let store = EnvCredentialStore::with_variables(
            "DASHBOARD_TEST_MISSING_USER",
            "DASHBOARD_TEST_MISSING_PASSWORD",
        );

        assert_eq!(
            store.admin_username().await.unwrap_err(),
            CredentialStoreError::NotConfigured("DASHBOARD_TEST_MISSING_USER".to_string())
        );
        assert!(matches!(
            store.admin_password_hash().await,
            Err(CredentialStoreError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_variables() {
        env::set_var("DASHBOARD_TEST_PRESENT_USER", "admin");
        env::set_var("DASHBOARD_TEST_PRESENT_PASSWORD", "$argon2id$v=19$m=65536,t=1,p=4$a$b");
        let store = EnvCredentialStore::with_variables(
            "DASHBOARD_TEST_PRESENT_USER",
            "DASHBOARD_TEST_PRESENT_PASSWORD",
        );

        assert_eq!(store.admin_username().await.unwrap(), "admin");
        assert!(store
            .admin_password_hash()
            .await
            .unwrap()
            .starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_empty_variable_is_not_configured() {
        env::set_var("DASHBOARD_TEST_EMPTY_USER", "");
        let store =
            EnvCredentialStore::with_variables("DASHBOARD_TEST_EMPTY_USER", "DASHBOARD_TEST_EMPTY_PW");

        assert!(matches!(
            store.admin_username().await,
            Err(CredentialStoreError::NotConfigured(_))
        ));
    }
}
