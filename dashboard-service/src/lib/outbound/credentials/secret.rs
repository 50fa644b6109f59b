use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::api::PostParams;
use kube::Api;
use kube::Client;
use tokio::sync::RwLock;

use crate::domain::credentials::errors::CredentialStoreError;
use crate::domain::credentials::models::NewCredentials;
use crate::domain::credentials::models::StoredCredentials;
use crate::domain::credentials::models::ADMIN_PASSWORD_HASH_KEY;
use crate::domain::credentials::models::ADMIN_USERNAME_KEY;
use crate::domain::credentials::models::JWT_SECRET_KEY;
use crate::domain::credentials::models::SERVICE_ACCOUNT_TOKEN_KEY;
use crate::domain::credentials::ports::ClusterCredentialStore;
use crate::domain::credentials::ports::CredentialStore;
use crate::outbound::credentials::client::token_client;
use crate::outbound::credentials::namespace::detect_namespace;

const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
const MANAGED_BY_VALUE: &str = "kube-dashboard";

impl From<kube::Error> for CredentialStoreError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => match response.code {
                401 | 403 => CredentialStoreError::PermissionDenied(response.message),
                404 => CredentialStoreError::NotFound,
                409 if response.reason == "AlreadyExists" => CredentialStoreError::AlreadyExists,
                _ => CredentialStoreError::Cluster(response.message),
            },
            other => CredentialStoreError::Cluster(other.to_string()),
        }
    }
}

struct ClientState {
    client: Option<Client>,
    /// Token the current client is scoped to; `None` for the inferred client.
    token: Option<String>,
}

/// Builds a client authenticated with the given access token.
pub type ClientFactory = Arc<dyn Fn(&str) -> Result<Client, CredentialStoreError> + Send + Sync>;

/// Credential store backed by one Kubernetes Secret.
pub struct SecretCredentialStore {
    state: RwLock<ClientState>,
    client_factory: ClientFactory,
    namespace: String,
    secret_name: String,
}

impl SecretCredentialStore {
    /// Create a store for `secret_name` in the detected namespace.
    ///
    /// The store starts with the inferred cluster client when one is
    /// available, and without a client otherwise.
    ///
    /// # Errors
    /// * `NotConfigured` - The namespace could not be determined
    pub async fn new(secret_name: impl Into<String>) -> Result<Self, CredentialStoreError> {
        let namespace = detect_namespace().ok_or_else(|| {
            CredentialStoreError::NotConfigured(
                "unable to determine namespace; mount the service account or set POD_NAMESPACE"
                    .to_string(),
            )
        })?;

        let client = match Client::try_default().await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "No cluster client available; credential secret unreadable until setup");
                None
            }
        };

        Ok(Self::with_client(client, namespace, secret_name))
    }

    pub fn with_client(
        client: Option<Client>,
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
    ) -> Self {
        Self {
            state: RwLock::new(ClientState {
                client,
                token: None,
            }),
            client_factory: Arc::new(token_client),
            namespace: namespace.into(),
            secret_name: secret_name.into(),
        }
    }

    /// Replace how token-scoped clients are built.
    pub fn with_client_factory(mut self, client_factory: ClientFactory) -> Self {
        self.client_factory = client_factory;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn client(&self) -> Option<Client> {
        self.state.read().await.client.clone()
    }

    fn api(&self, client: Client) -> Api<Secret> {
        Api::namespaced(client, &self.namespace)
    }

    async fn adopt(&self, client: Client, token: &str) {
        let mut state = self.state.write().await;
        state.client = Some(client);
        state.token = Some(token.to_string());
    }

    /// Switch to a client scoped to the persisted access token.
    async fn adopt_stored_token(&self, stored: &StoredCredentials) {
        let Some(token) = stored.service_account_token.as_deref().filter(|t| !t.is_empty()) else {
            return;
        };
        if self.state.read().await.token.as_deref() == Some(token) {
            return;
        }

        match (self.client_factory)(token) {
            Ok(client) => {
                self.adopt(client, token).await;
                tracing::info!(secret = %self.secret_name, "Using stored service account token");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot build client from stored service account token");
            }
        }
    }

    async fn read_stored(
        &self,
        client: Client,
    ) -> Result<Option<StoredCredentials>, CredentialStoreError> {
        let secret = self.api(client).get_opt(&self.secret_name).await?;
        Ok(secret.as_ref().map(decode_secret))
    }
}

#[async_trait]
impl CredentialStore for SecretCredentialStore {
    async fn admin_username(&self) -> Result<String, CredentialStoreError> {
        self.read_credentials()
            .await?
            .and_then(|stored| stored.admin_username)
            .filter(|username| !username.is_empty())
            .ok_or_else(|| CredentialStoreError::NotConfigured(ADMIN_USERNAME_KEY.to_string()))
    }

    async fn admin_password_hash(&self) -> Result<String, CredentialStoreError> {
        self.read_credentials()
            .await?
            .and_then(|stored| stored.admin_password_hash)
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| CredentialStoreError::NotConfigured(ADMIN_PASSWORD_HASH_KEY.to_string()))
    }
}

#[async_trait]
impl ClusterCredentialStore for SecretCredentialStore {
    async fn secret_exists(&self) -> Result<bool, CredentialStoreError> {
        let Some(client) = self.client().await else {
            return Ok(false);
        };
        Ok(self.api(client).get_opt(&self.secret_name).await?.is_some())
    }

    async fn read_credentials(&self) -> Result<Option<StoredCredentials>, CredentialStoreError> {
        let Some(client) = self.client().await else {
            return Ok(None);
        };

        let stored = self.read_stored(client).await?;
        if let Some(stored) = &stored {
            self.adopt_stored_token(stored).await;
        }
        Ok(stored)
    }

    async fn create(&self, credentials: &NewCredentials) -> Result<(), CredentialStoreError> {
        credentials.validate()?;

        let client = (self.client_factory)(&credentials.access_token)?;
        let secret = build_secret(
            &self.secret_name,
            &self.namespace,
            encode_credentials(&credentials.to_stored()),
        );
        self.api(client.clone())
            .create(&PostParams::default(), &secret)
            .await?;

        tracing::info!(secret = %self.secret_name, namespace = %self.namespace, "Created credential secret");
        self.adopt(client, &credentials.access_token).await;
        Ok(())
    }

    async fn create_or_update(
        &self,
        credentials: &NewCredentials,
    ) -> Result<(), CredentialStoreError> {
        credentials.validate()?;

        let client = (self.client_factory)(&credentials.access_token)?;
        let api = self.api(client.clone());
        let fields = encode_credentials(&credentials.to_stored());

        match api.get_opt(&self.secret_name).await? {
            None => {
                let secret = build_secret(&self.secret_name, &self.namespace, fields);
                api.create(&PostParams::default(), &secret).await?;
                tracing::info!(secret = %self.secret_name, namespace = %self.namespace, "Created credential secret");
            }
            Some(existing) if decode_secret(&existing).has_admin() => {
                tracing::warn!(secret = %self.secret_name, "Credential secret already holds an admin; refusing setup write");
                return Err(CredentialStoreError::AlreadyConfigured);
            }
            Some(mut existing) => {
                merge_data(&mut existing, fields);
                api.replace(&self.secret_name, &PostParams::default(), &existing)
                    .await?;
                tracing::info!(secret = %self.secret_name, namespace = %self.namespace, "Completed credential secret");
            }
        }

        self.adopt(client, &credentials.access_token).await;
        Ok(())
    }

    async fn update_password(&self, password_hash: &str) -> Result<(), CredentialStoreError> {
        if password_hash.is_empty() {
            return Err(CredentialStoreError::InvalidValue(
                "admin password hash is empty".to_string(),
            ));
        }
        let client = self.client().await.ok_or_else(|| {
            CredentialStoreError::NotConfigured("no cluster client available".to_string())
        })?;
        let api = self.api(client);

        let mut secret = api
            .get_opt(&self.secret_name)
            .await?
            .ok_or(CredentialStoreError::NotFound)?;
        merge_data(
            &mut secret,
            BTreeMap::from([(
                ADMIN_PASSWORD_HASH_KEY.to_string(),
                ByteString(password_hash.as_bytes().to_vec()),
            )]),
        );
        api.replace(&self.secret_name, &PostParams::default(), &secret)
            .await?;

        tracing::info!(secret = %self.secret_name, "Admin password updated");
        Ok(())
    }

    async fn update_access_token(&self, access_token: &str) -> Result<(), CredentialStoreError> {
        if access_token.is_empty() {
            return Err(CredentialStoreError::InvalidValue(
                "service account token is empty".to_string(),
            ));
        }

        let client = (self.client_factory)(access_token)?;
        let api = self.api(client.clone());
        let fields = BTreeMap::from([(
            SERVICE_ACCOUNT_TOKEN_KEY.to_string(),
            ByteString(access_token.as_bytes().to_vec()),
        )]);

        match api.get_opt(&self.secret_name).await? {
            None => {
                let secret = build_secret(&self.secret_name, &self.namespace, fields);
                api.create(&PostParams::default(), &secret).await?;
            }
            Some(existing) if decode_secret(&existing).has_admin() => {
                tracing::warn!(secret = %self.secret_name, "Credential secret already holds an admin; refusing token update");
                return Err(CredentialStoreError::AlreadyConfigured);
            }
            Some(mut existing) => {
                merge_data(&mut existing, fields);
                api.replace(&self.secret_name, &PostParams::default(), &existing)
                    .await?;
            }
        }

        tracing::info!(secret = %self.secret_name, "Service account token stored");
        self.adopt(client, access_token).await;
        Ok(())
    }
}

/// Read the credential fields of a secret, ignoring unrelated keys.
pub fn decode_secret(secret: &Secret) -> StoredCredentials {
    let field = |key: &str| -> Option<String> {
        secret
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .and_then(|value| String::from_utf8(value.0.clone()).ok())
            .or_else(|| {
                secret
                    .string_data
                    .as_ref()
                    .and_then(|data| data.get(key))
                    .cloned()
            })
    };

    StoredCredentials {
        admin_username: field(ADMIN_USERNAME_KEY),
        admin_password_hash: field(ADMIN_PASSWORD_HASH_KEY),
        jwt_secret: field(JWT_SECRET_KEY),
        service_account_token: field(SERVICE_ACCOUNT_TOKEN_KEY),
    }
}

/// Encode the present credential fields as secret data.
pub fn encode_credentials(stored: &StoredCredentials) -> BTreeMap<String, ByteString> {
    [
        (ADMIN_USERNAME_KEY, &stored.admin_username),
        (ADMIN_PASSWORD_HASH_KEY, &stored.admin_password_hash),
        (JWT_SECRET_KEY, &stored.jwt_secret),
        (SERVICE_ACCOUNT_TOKEN_KEY, &stored.service_account_token),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value
            .as_ref()
            .map(|value| (key.to_string(), ByteString(value.as_bytes().to_vec())))
    })
    .collect()
}

fn build_secret(name: &str, namespace: &str, data: BTreeMap<String, ByteString>) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                MANAGED_BY_LABEL.to_string(),
                MANAGED_BY_VALUE.to_string(),
            )])),
            ..Default::default()
        },
        type_: Some("Opaque".to_string()),
        data: Some(data),
        ..Default::default()
    }
}

/// Overwrite `fields` in the secret, keeping every other key.
fn merge_data(secret: &mut Secret, fields: BTreeMap<String, ByteString>) {
    let data = secret.data.get_or_insert_with(BTreeMap::new);
    if let Some(string_data) = secret.string_data.take() {
        for (key, value) in string_data {
            data.entry(key)
                .or_insert_with(|| ByteString(value.into_bytes()));
        }
    }
    data.extend(fields);
}
