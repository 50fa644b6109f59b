#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;
use dashboard_service::domain::credentials::errors::CredentialStoreError;
use dashboard_service::domain::credentials::models::NewCredentials;
use dashboard_service::domain::credentials::models::StoredCredentials;
use dashboard_service::domain::credentials::ports::ClusterCredentialStore;
use dashboard_service::domain::credentials::ports::CredentialBackend;
use dashboard_service::domain::credentials::ports::CredentialStore;
use dashboard_service::domain::setup::ports::ServiceReloader;
use dashboard_service::inbound::http::router::create_router;
use dashboard_service::inbound::http::runtime::ServiceRuntime;
use reqwest::header;
use serde_json::json;

pub const ALLOWED_ORIGIN: &str = "https://dashboard.example.com";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "strongpass123";
pub const SERVICE_ACCOUNT_TOKEN: &str = "sa-token-value";

/// In-memory stand-in for the cluster secret.
#[derive(Default)]
pub struct MemoryCredentialStore {
    record: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn record(&self) -> Option<StoredCredentials> {
        self.record.lock().unwrap().clone()
    }

    /// Overwrite the record directly, bypassing the service.
    pub fn set_record(&self, record: Option<StoredCredentials>) {
        *self.record.lock().unwrap() = record;
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn admin_username(&self) -> Result<String, CredentialStoreError> {
        self.record()
            .and_then(|r| r.admin_username)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CredentialStoreError::NotConfigured("admin-username".to_string()))
    }

    async fn admin_password_hash(&self) -> Result<String, CredentialStoreError> {
        self.record()
            .and_then(|r| r.admin_password_hash)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CredentialStoreError::NotConfigured("admin-password-hash".to_string()))
    }
}

#[async_trait]
impl ClusterCredentialStore for MemoryCredentialStore {
    async fn secret_exists(&self) -> Result<bool, CredentialStoreError> {
        Ok(self.record().is_some())
    }

    async fn read_credentials(&self) -> Result<Option<StoredCredentials>, CredentialStoreError> {
        Ok(self.record())
    }

    async fn create(&self, credentials: &NewCredentials) -> Result<(), CredentialStoreError> {
        credentials.validate()?;
        let mut record = self.record.lock().unwrap();
        if record.is_some() {
            return Err(CredentialStoreError::AlreadyExists);
        }
        *record = Some(credentials.to_stored());
        Ok(())
    }

    async fn create_or_update(
        &self,
        credentials: &NewCredentials,
    ) -> Result<(), CredentialStoreError> {
        credentials.validate()?;
        let mut record = self.record.lock().unwrap();
        if record.as_ref().is_some_and(StoredCredentials::has_admin) {
            return Err(CredentialStoreError::AlreadyConfigured);
        }
        *record = Some(credentials.to_stored());
        Ok(())
    }

    async fn update_password(&self, password_hash: &str) -> Result<(), CredentialStoreError> {
        let mut record = self.record.lock().unwrap();
        let stored = record.as_mut().ok_or(CredentialStoreError::NotFound)?;
        stored.admin_password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn update_access_token(&self, access_token: &str) -> Result<(), CredentialStoreError> {
        if access_token.is_empty() {
            return Err(CredentialStoreError::InvalidValue("empty token".to_string()));
        }
        let mut record = self.record.lock().unwrap();
        if record.as_ref().is_some_and(StoredCredentials::has_admin) {
            return Err(CredentialStoreError::AlreadyConfigured);
        }
        record.get_or_insert_with(StoredCredentials::default).service_account_token =
            Some(access_token.to_string());
        Ok(())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<MemoryCredentialStore>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in setup mode
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryCredentialStore::default());

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let runtime = Arc::new(ServiceRuntime::new(
            CredentialBackend::Cluster(store.clone()),
            None,
            Duration::hours(24),
        ));
        runtime.reload().await.expect("Failed to load runtime");

        let router = create_router(runtime, vec![ALLOWED_ORIGIN.to_string()]);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            store,
            // Cookies are handled explicitly; the session cookie is Secure
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Spawn the application with setup already completed
    pub async fn spawn_configured() -> Self {
        let app = Self::spawn().await;
        let response = app
            .complete_setup(json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD,
                "serviceAccountToken": SERVICE_ACCOUNT_TOKEN,
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        app
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request from an allowed origin
    pub fn post_from_allowed_origin(&self, path: &str) -> reqwest::RequestBuilder {
        self.post(path).header(header::ORIGIN, ALLOWED_ORIGIN)
    }

    /// Helper to make GET request with the session cookie
    pub fn get_with_cookie(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path)
            .header(header::COOKIE, format!("token={}", token))
    }

    /// Helper to make POST request with the session cookie
    pub fn post_with_cookie(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path)
            .header(header::COOKIE, format!("token={}", token))
    }

    pub async fn complete_setup(&self, body: serde_json::Value) -> reqwest::Response {
        self.post_from_allowed_origin("/api/setup/complete")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/api/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in as the admin and return the session token
    pub async fn login_admin(&self) -> String {
        let response = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        session_cookie(&response)
            .map(|cookie| cookie.value)
            .expect("Missing session cookie")
    }
}

/// A parsed `Set-Cookie` for the session
#[derive(Debug)]
pub struct SetCookie {
    pub value: String,
    pub attributes: Vec<String>,
}

impl SetCookie {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attribute))
    }
}

pub fn session_cookie(response: &reqwest::Response) -> Option<SetCookie> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("token="))
        .map(|value| {
            let mut parts = value.split(';').map(str::trim);
            let value = parts
                .next()
                .unwrap_or_default()
                .trim_start_matches("token=")
                .to_string();
            SetCookie {
                value,
                attributes: parts.map(str::to_string).collect(),
            }
        })
}
