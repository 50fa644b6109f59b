use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::setup_complete::SetupResponse;
use super::ApiError;
use crate::inbound::http::router::AppState;

pub async fn setup_token(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTokenRequest>, JsonRejection>,
) -> Result<Json<SetupResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = state
        .setup_service
        .update_token(&body.service_account_token)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SetupResponse {
        message: "Service account token updated".to_string(),
        reloaded: outcome.reloaded,
    }))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTokenRequest {
    service_account_token: String,
}
