use std::env;
use std::fs;
use std::path::Path;

pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
pub const POD_NAMESPACE_ENV: &str = "POD_NAMESPACE";

/// Namespace the service runs in: the mounted service account namespace file,
/// else `POD_NAMESPACE`.
pub fn detect_namespace() -> Option<String> {
    let mounted = Path::new(SERVICE_ACCOUNT_DIR).join("namespace");
    detect_namespace_from(&mounted, env::var(POD_NAMESPACE_ENV).ok())
}

pub fn detect_namespace_from(mounted: &Path, override_value: Option<String>) -> Option<String> {
    fs::read_to_string(mounted)
        .ok()
        .map(|contents| contents.trim().to_string())
        .filter(|namespace| !namespace.is_empty())
        .or_else(|| {
            override_value
                .map(|value| value.trim().to_string())
                .filter(|namespace| !namespace.is_empty())
        })
}
