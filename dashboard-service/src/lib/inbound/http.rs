pub mod handlers;
pub mod middleware;
pub mod origin;
pub mod router;
pub mod runtime;
pub mod session;
