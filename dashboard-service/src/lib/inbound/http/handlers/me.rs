use auth::IdentityProvider;
use auth::Permissions;
use auth::Role;
use auth::SessionClaims;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::domain::auth::models::CurrentUser;
use crate::domain::auth::service::AuthService;

pub async fn me(claims: Option<Extension<SessionClaims>>) -> Result<Json<MeResponse>, ApiError> {
    AuthService::get_current_user(claims.as_deref())
        .map(|user| Json(user.into()))
        .map_err(ApiError::from)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: Role,
    pub idp: IdentityProvider,
    /// Empty when the session carries no namespace restrictions.
    pub permissions: Permissions,
}

impl From<CurrentUser> for MeResponse {
    fn from(user: CurrentUser) -> Self {
        Self {
            username: user.username,
            role: user.role,
            idp: user.identity_provider,
            permissions: user.permissions.unwrap_or_default(),
        }
    }
}
