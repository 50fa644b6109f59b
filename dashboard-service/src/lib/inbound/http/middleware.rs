use auth::SessionClaims;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::origin::origin_allowed;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::extract_token;

/// Validated session claims, attached by [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Middleware that refuses requests during setup and validates the session
/// token, adding its claims to request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let snapshot = state.runtime.current().await;
    let auth_service = snapshot.ready().ok_or_else(ApiError::setup_required)?;

    let token = extract_token(req.headers(), req.uri().query(), &jar)
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    let claims = auth_service
        .validate_session(&token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that only admits setup writes from an allowed origin.
pub async fn require_allowed_origin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !origin_allowed(req.headers(), &state.allowed_origins) {
        tracing::warn!(
            origin = ?req.headers().get(axum::http::header::ORIGIN),
            "Setup request from disallowed origin"
        );
        return Err(ApiError::Forbidden("Origin not allowed".to_string()));
    }

    Ok(next.run(req).await)
}
