use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub credentials: CredentialsConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Origins allowed to call the setup endpoints and to make credentialed
    /// cross-origin requests.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Which credential store backs the admin identity.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackendKind {
    /// Cluster secret when a namespace can be detected, else environment.
    Auto,
    Environment,
    Cluster,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    pub backend: CredentialBackendKind,
    pub secret_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub expiration_hours: i64,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SERVER__HTTP_PORT, CREDENTIALS__BACKEND, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8080)?
            .set_default("server.allowed_origins", Vec::<String>::new())?
            .set_default("credentials.backend", "auto")?
            .set_default("credentials.secret_name", "kube-dashboard-credentials")?
            .set_default("session.expiration_hours", 24)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: SERVER__HTTP_PORT=9090 overrides server.http_port
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}
