use std::sync::Arc;

use auth::jwt::MIN_SECRET_LENGTH;
use auth::PasswordHasher;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::credentials::errors::CredentialStoreError;
use crate::domain::credentials::models::NewCredentials;
use crate::domain::credentials::ports::ClusterCredentialStore;
use crate::domain::credentials::ports::CredentialBackend;
use crate::domain::setup::errors::SetupError;
use crate::domain::setup::models::CompleteSetupCommand;
use crate::domain::setup::models::SetupOutcome;
use crate::domain::setup::models::SetupStatus;
use crate::domain::setup::ports::ServiceReloader;

pub const MIN_PASSWORD_LENGTH: usize = 8;

const GENERATED_SECRET_BYTES: usize = 32;

/// First-run bootstrap and access token replacement.
pub struct SetupService {
    credentials: CredentialBackend,
    reloader: Arc<dyn ServiceReloader>,
    password_hasher: PasswordHasher,
}

impl SetupService {
    pub fn new(credentials: CredentialBackend, reloader: Arc<dyn ServiceReloader>) -> Self {
        Self {
            credentials,
            reloader,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Report whether an admin identity still has to be created.
    pub async fn check_status(&self) -> Result<SetupStatus, SetupError> {
        setup_status(&self.credentials).await
    }

    /// Create the admin identity and persist all credentials.
    ///
    /// # Errors
    /// * `AlreadyConfigured` - An admin username is already stored
    /// * `Validation` - A field failed validation
    /// * `Configuration` - The backend cannot persist credentials
    /// * `PermissionDenied` - The supplied access token may not write the secret
    pub async fn complete_setup(
        &self,
        command: CompleteSetupCommand,
    ) -> Result<SetupOutcome, SetupError> {
        let store = self.cluster_store()?;

        match store.read_credentials().await {
            Ok(Some(stored)) if stored.has_admin() => return Err(SetupError::AlreadyConfigured),
            Ok(_) => {}
            Err(e) if e.is_permission_denied() => {
                tracing::warn!(error = %e, "Cannot read credential secret; proceeding with setup");
            }
            Err(e) => return Err(e.into()),
        }

        let username = command.username.trim();
        if username.is_empty() {
            return Err(SetupError::Validation("Username is required".to_string()));
        }
        if command.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SetupError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let access_token = command.access_token.trim();
        if access_token.is_empty() {
            return Err(SetupError::Validation(
                "Service account token is required".to_string(),
            ));
        }
        let signing_secret = match command.signing_secret.filter(|s| !s.is_empty()) {
            Some(secret) if secret.len() < MIN_SECRET_LENGTH => {
                return Err(SetupError::Validation(format!(
                    "JWT secret must be at least {} characters",
                    MIN_SECRET_LENGTH
                )));
            }
            Some(secret) => secret,
            None => generate_signing_secret(),
        };

        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| SetupError::Internal(e.to_string()))?;

        let credentials =
            NewCredentials::new(username, password_hash, signing_secret, access_token)?;
        store.create_or_update(&credentials).await?;

        tracing::info!(username = %username, "Setup completed");

        Ok(SetupOutcome {
            reloaded: self.reload().await,
        })
    }

    /// Replace the stored access token while setup is still pending.
    ///
    /// # Errors
    /// * `NotInSetup` - An admin already exists or the backend cannot rotate
    /// * `Validation` - Token is empty
    pub async fn update_token(&self, access_token: &str) -> Result<SetupOutcome, SetupError> {
        let Some(store) = self.credentials.cluster() else {
            return Err(SetupError::NotInSetup);
        };

        // A denied read cannot prove that no admin exists.
        match store.read_credentials().await {
            Ok(Some(stored)) if stored.has_admin() => return Err(SetupError::NotInSetup),
            Ok(_) => {}
            Err(e) if e.is_permission_denied() => {
                tracing::warn!(error = %e, "Cannot read credential secret; refusing token update");
                return Err(SetupError::NotInSetup);
            }
            Err(e) => return Err(e.into()),
        }

        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(SetupError::Validation("Token is required".to_string()));
        }

        store
            .update_access_token(access_token)
            .await
            .map_err(|e| match e {
                CredentialStoreError::AlreadyConfigured => SetupError::NotInSetup,
                other => other.into(),
            })?;

        tracing::info!("Service account token updated");

        Ok(SetupOutcome {
            reloaded: self.reload().await,
        })
    }

    fn cluster_store(&self) -> Result<&Arc<dyn ClusterCredentialStore>, SetupError> {
        self.credentials.cluster().ok_or_else(|| {
            SetupError::Configuration(format!(
                "the {} credential backend cannot persist credentials",
                self.credentials.name()
            ))
        })
    }

    async fn reload(&self) -> bool {
        match self.reloader.reload().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Credentials persisted but service reload failed");
                false
            }
        }
    }
}

/// Derive the setup status from the credential store.
///
/// A cluster store that denies reads counts as unconfigured so the operator
/// can still supply a working access token.
pub async fn setup_status(credentials: &CredentialBackend) -> Result<SetupStatus, SetupError> {
    let store = match credentials {
        CredentialBackend::Environment(store) => {
            return match store.admin_username().await {
                Ok(_) => Ok(SetupStatus::new(false)),
                Err(CredentialStoreError::NotConfigured(_)) => Ok(SetupStatus::new(true)),
                Err(e) => Err(e.into()),
            };
        }
        CredentialBackend::Cluster(store) => store,
    };

    match store.read_credentials().await {
        Ok(Some(stored)) => Ok(SetupStatus::new(!stored.has_admin())),
        Ok(None) => Ok(SetupStatus::new(true)),
        Err(e) if e.is_permission_denied() => {
            tracing::warn!(error = %e, "Cannot read credential secret; reporting setup required");
            Ok(SetupStatus::new(true))
        }
        Err(e) => Err(e.into()),
    }
}

fn generate_signing_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
