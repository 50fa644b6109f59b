use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::IdentityProvider;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::Permissions;
use crate::jwt::Role;
use crate::jwt::SessionClaims;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and session
/// token handling.
///
/// One instance is bound to one signing secret; rotating the secret means
/// building a new `Authenticator`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Signed session token
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Errors
    /// * `WeakSecret` - `signing_secret` is shorter than 32 bytes
    pub fn new(signing_secret: &[u8]) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(signing_secret)?,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed or evaluated
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        if self.password_hasher.verify(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Issue a session token valid for `ttl` from now.
    pub fn issue_session(
        &self,
        username: &str,
        role: Role,
        idp: IdentityProvider,
        permissions: Option<Permissions>,
        ttl: Duration,
    ) -> Result<IssuedToken, JwtError> {
        let claims = SessionClaims::new(username, role, idp, permissions, ttl);
        self.issue(&claims)
    }

    /// Sign already-built claims; expiry is whatever `claims.exp` says.
    pub fn issue(&self, claims: &SessionClaims) -> Result<IssuedToken, JwtError> {
        let token = self.jwt_handler.encode(claims)?;
        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Validate a session token and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Bad signature, expired, or malformed token
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
