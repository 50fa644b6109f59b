use std::fmt;

use serde::Serialize;

/// Whether the dashboard still needs its first-run setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub setup_required: bool,
    /// Reserved; always `false`.
    pub token_update_required: bool,
}

impl SetupStatus {
    pub fn new(setup_required: bool) -> Self {
        Self {
            setup_required,
            token_update_required: false,
        }
    }
}

/// Admin bootstrap request.
#[derive(Clone, PartialEq, Eq)]
pub struct CompleteSetupCommand {
    pub username: String,
    pub password: String,
    /// Generated when absent.
    pub signing_secret: Option<String>,
    pub access_token: String,
}

impl fmt::Debug for CompleteSetupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompleteSetupCommand")
            .field("username", &self.username)
            .field("signing_secret", &self.signing_secret.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Result of a successful credential write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupOutcome {
    /// Whether the running service picked up the new credentials.
    pub reloaded: bool,
}
