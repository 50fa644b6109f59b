use std::env;
use std::fs;
use std::path::Path;

use kube::config::AuthInfo;
use kube::Client;
use kube::Config;
use secrecy::SecretString;

use crate::domain::credentials::errors::CredentialStoreError;
use crate::outbound::credentials::namespace::SERVICE_ACCOUNT_DIR;

pub const K8S_CA_PEM_ENV: &str = "K8S_CA_PEM";
pub const K8S_INSECURE_SKIP_VERIFY_ENV: &str = "K8S_INSECURE_SKIP_VERIFY";
pub const GO_ENV_ENV: &str = "GO_ENV";

const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// How an ephemeral client authenticates the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportTrust {
    /// DER encoded root certificates.
    RootCertificates(Vec<Vec<u8>>),
    InsecureSkipVerify,
}

/// Everything the trust decision depends on.
#[derive(Debug, Clone, Default)]
pub struct TrustInputs {
    pub explicit_ca_pem: Option<String>,
    pub mounted_ca_pem: Option<String>,
    pub insecure_skip_verify: bool,
    pub production: bool,
}

impl TrustInputs {
    pub fn from_env() -> Self {
        let mounted_ca = Path::new(SERVICE_ACCOUNT_DIR).join("ca.crt");
        Self {
            explicit_ca_pem: env::var(K8S_CA_PEM_ENV).ok().filter(|pem| !pem.trim().is_empty()),
            mounted_ca_pem: fs::read_to_string(mounted_ca)
                .ok()
                .filter(|pem| !pem.trim().is_empty()),
            insecure_skip_verify: env::var(K8S_INSECURE_SKIP_VERIFY_ENV)
                .is_ok_and(|value| value.eq_ignore_ascii_case("true")),
            production: env::var(GO_ENV_ENV).is_ok_and(|value| value == "production"),
        }
    }
}

/// Decide transport trust for a client built outside the standard in-cluster
/// configuration.
///
/// An explicit CA is preferred over the mounted one. Unverified transport is
/// only allowed with the insecure override, and the override is refused in
/// production.
///
/// # Errors
/// * `UntrustedTransport` - No usable CA and no permitted override
pub fn resolve_trust(inputs: &TrustInputs) -> Result<TransportTrust, CredentialStoreError> {
    if inputs.insecure_skip_verify && inputs.production {
        return Err(CredentialStoreError::UntrustedTransport(format!(
            "{} is not permitted when {}=production",
            K8S_INSECURE_SKIP_VERIFY_ENV, GO_ENV_ENV
        )));
    }

    if let Some(pem) = inputs.explicit_ca_pem.as_deref() {
        return parse_pem_certificates(pem).map(TransportTrust::RootCertificates);
    }
    if let Some(pem) = inputs.mounted_ca_pem.as_deref() {
        return parse_pem_certificates(pem).map(TransportTrust::RootCertificates);
    }

    if inputs.insecure_skip_verify {
        tracing::warn!("No cluster CA available; TLS verification disabled by override");
        return Ok(TransportTrust::InsecureSkipVerify);
    }

    Err(CredentialStoreError::UntrustedTransport(format!(
        "no cluster CA available; mount ca.crt or set {}",
        K8S_CA_PEM_ENV
    )))
}

/// Parse every certificate in a PEM bundle.
pub fn parse_pem_certificates(pem: &str) -> Result<Vec<Vec<u8>>, CredentialStoreError> {
    let certificates = rustls_pemfile::certs(&mut pem.as_bytes())
        .map(|certificate| certificate.map(|der| der.to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CredentialStoreError::UntrustedTransport(format!("invalid CA PEM: {}", e)))?;

    if certificates.is_empty() {
        return Err(CredentialStoreError::UntrustedTransport(
            "CA PEM contains no certificates".to_string(),
        ));
    }

    Ok(certificates)
}

/// Build a client that authenticates solely with `token`.
///
/// # Errors
/// * `UntrustedTransport` - Transport trust could not be established
/// * `NotConfigured` - The API server address is unknown
pub fn token_client(token: &str) -> Result<Client, CredentialStoreError> {
    let mut config = match Config::incluster() {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!(error = %e, "In-cluster config unavailable; building client from environment");
            environment_config()?
        }
    };

    // Replaces any token file from the inferred config.
    config.auth_info = AuthInfo {
        token: Some(SecretString::from(token.to_string())),
        ..Default::default()
    };

    Client::try_from(config).map_err(|e| CredentialStoreError::Cluster(e.to_string()))
}

fn environment_config() -> Result<Config, CredentialStoreError> {
    let host = env::var(SERVICE_HOST_ENV)
        .map_err(|_| CredentialStoreError::NotConfigured(SERVICE_HOST_ENV.to_string()))?;
    let port = env::var(SERVICE_PORT_ENV).unwrap_or_else(|_| "443".to_string());

    let uri = api_server_uri(&host, &port)
        .parse::<http::Uri>()
        .map_err(|e| CredentialStoreError::NotConfigured(format!("invalid API server address: {}", e)))?;

    let mut config = Config::new(uri);
    match resolve_trust(&TrustInputs::from_env())? {
        TransportTrust::RootCertificates(certificates) => config.root_cert = Some(certificates),
        TransportTrust::InsecureSkipVerify => config.accept_invalid_certs = true,
    }

    Ok(config)
}

fn api_server_uri(host: &str, port: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("https://[{}]:{}", host, port)
    } else {
        format!("https://{}:{}", host, port)
    }
}
