use auth::IdentityProvider;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;

use super::ApiError;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::setup::service::MIN_PASSWORD_LENGTH;
use crate::inbound::http::middleware::CurrentSession;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    CurrentSession(claims): CurrentSession,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let store = state.runtime.credentials().cluster().cloned().ok_or_else(|| {
        ApiError::InternalServerError(
            "password change requires the cluster credential backend".to_string(),
        )
    })?;
    let snapshot = state.runtime.snapshot().await;
    let auth_service = snapshot.ready().ok_or_else(ApiError::setup_required)?;

    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let command = LoginCommand::new(
        claims.username.clone(),
        body.current_password,
        Some(IdentityProvider::Core),
    );
    auth_service.login(&command).await.map_err(|e| match e {
        AuthError::Internal(_) | AuthError::Configuration(_) => ApiError::from(e),
        _ => ApiError::Unauthorized("Current password is incorrect".to_string()),
    })?;

    if body.new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = auth_service.hash_password(&body.new_password)?;
    store
        .update_password(&password_hash)
        .await
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    tracing::info!(username = %claims.username, "Admin password changed");

    Ok(Json(json!({ "message": "Password updated" })))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}
