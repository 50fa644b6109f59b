pub mod auth;
pub mod credentials;
pub mod directory;
pub mod setup;
