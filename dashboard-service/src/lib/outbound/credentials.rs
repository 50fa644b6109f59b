pub mod client;
pub mod env;
pub mod namespace;
pub mod secret;
