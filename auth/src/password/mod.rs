//! Argon2 password hashing over the `$argon2id$v=19$m=..,t=..,p=..$salt$digest`
//! encoding shared with other tooling that writes the credential secret.

mod argon2;
mod errors;

pub use self::argon2::PasswordHasher;
pub use self::errors::PasswordError;
