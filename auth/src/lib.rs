//! Authentication utilities library
//!
//! Provides the credential primitives used by the dashboard service:
//! - Password hashing (Argon2id, self-describing encoded hashes)
//! - Session token issuance and validation (HS256 JWT)
//! - Authentication coordination bound to one signing secret
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{Authenticator, IdentityProvider, Role};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let issued = auth
//!     .issue_session("admin", Role::Admin, IdentityProvider::Core, None, Duration::hours(24))
//!     .unwrap();
//! let claims = auth.validate_session(&issued.token).unwrap();
//! assert_eq!(claims.role, Role::Admin);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedToken;
pub use jwt::IdentityProvider;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::Permissions;
pub use jwt::Role;
pub use jwt::SessionClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
