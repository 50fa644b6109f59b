pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::IdentityProvider;
pub use claims::Permissions;
pub use claims::Role;
pub use claims::SessionClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use handler::MIN_SECRET_LENGTH;
