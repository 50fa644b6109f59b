use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Duration;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

use crate::domain::auth::service::AuthService;
use crate::domain::credentials::ports::CredentialBackend;
use crate::domain::directory::ports::DirectoryAuthenticator;
use crate::domain::setup::ports::ServiceReloader;
use crate::domain::setup::service::setup_status;
use crate::outbound::credentials::env::env_signing_secret;

/// What a request sees of the running service.
#[derive(Clone)]
pub struct RuntimeSnapshot {
    /// Absent until a signing secret is available.
    pub auth_service: Option<Arc<AuthService>>,
    pub setup_required: bool,
}

impl RuntimeSnapshot {
    fn setup_mode() -> Self {
        Self {
            auth_service: None,
            setup_required: true,
        }
    }

    /// The auth service, unless the dashboard is still in setup mode.
    pub fn ready(&self) -> Option<&Arc<AuthService>> {
        if self.setup_required {
            None
        } else {
            self.auth_service.as_ref()
        }
    }
}

/// Holds the current auth service and setup flag; rebuilt in place after
/// credential writes.
pub struct ServiceRuntime {
    credentials: CredentialBackend,
    directory: Option<Arc<dyn DirectoryAuthenticator>>,
    session_ttl: Duration,
    snapshot: RwLock<RuntimeSnapshot>,
    /// Held across build and commit so reloads apply in order.
    reload_lock: Mutex<()>,
}

impl ServiceRuntime {
    /// Start in setup mode; call [`ServiceReloader::reload`] to load credentials.
    pub fn new(
        credentials: CredentialBackend,
        directory: Option<Arc<dyn DirectoryAuthenticator>>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            directory,
            session_ttl,
            snapshot: RwLock::new(RuntimeSnapshot::setup_mode()),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &CredentialBackend {
        &self.credentials
    }

    pub async fn snapshot(&self) -> RuntimeSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Snapshot for a gated request.
    ///
    /// The setup state is read from the store on every call. When it no
    /// longer matches the snapshot, for instance because the secret was
    /// written by another tool, the runtime reloads first.
    pub async fn current(&self) -> RuntimeSnapshot {
        let snapshot = self.snapshot().await;

        let setup_required = match setup_status(&self.credentials).await {
            Ok(status) => status.setup_required,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot determine setup status; using loaded state");
                return snapshot;
            }
        };
        let in_sync = setup_required == snapshot.setup_required
            && (setup_required || snapshot.auth_service.is_some());
        if in_sync {
            return snapshot;
        }

        tracing::info!(setup_required, "Credential store changed; reloading");
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Reload after credential change failed");
        }
        self.snapshot().await
    }

    async fn signing_secret(&self) -> Option<String> {
        if let Some(store) = self.credentials.cluster() {
            match store.read_credentials().await {
                Ok(Some(stored)) => {
                    if let Some(secret) = stored.jwt_secret.filter(|s| !s.is_empty()) {
                        return Some(secret);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot read signing secret from credential secret");
                }
            }
        }
        env_signing_secret()
    }

    async fn build(&self) -> Result<RuntimeSnapshot, String> {
        let setup_required = setup_status(&self.credentials)
            .await
            .map_err(|e| e.to_string())?
            .setup_required;

        let auth_service = match self.signing_secret().await {
            Some(secret) => {
                let authenticator =
                    Authenticator::new(secret.as_bytes()).map_err(|e| e.to_string())?;
                Some(Arc::new(AuthService::new(
                    Arc::new(authenticator),
                    self.credentials.clone(),
                    self.directory.clone(),
                    self.session_ttl,
                )))
            }
            None => {
                tracing::warn!("No signing secret available; sessions disabled until setup completes");
                None
            }
        };

        Ok(RuntimeSnapshot {
            auth_service,
            setup_required,
        })
    }
}

#[async_trait]
impl ServiceReloader for ServiceRuntime {
    async fn reload(&self) -> Result<(), String> {
        let _guard = self.reload_lock.lock().await;
        let snapshot = self.build().await?;

        tracing::info!(
            backend = self.credentials.name(),
            setup_required = snapshot.setup_required,
            sessions_enabled = snapshot.auth_service.is_some(),
            "Auth service loaded"
        );

        *self.snapshot.write().await = snapshot;
        Ok(())
    }
}
