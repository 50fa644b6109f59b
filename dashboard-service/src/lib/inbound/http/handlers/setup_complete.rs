use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::setup::models::CompleteSetupCommand;
use crate::inbound::http::router::AppState;

pub async fn setup_complete(
    State(state): State<AppState>,
    payload: Result<Json<CompleteSetupRequest>, JsonRejection>,
) -> Result<Json<SetupResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let outcome = state
        .setup_service
        .complete_setup(body.into())
        .await
        .map_err(ApiError::from)?;

    let message = if outcome.reloaded {
        "Setup completed"
    } else {
        "Credentials saved; service reload pending"
    };

    Ok(Json(SetupResponse {
        message: message.to_string(),
        reloaded: outcome.reloaded,
    }))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSetupRequest {
    username: String,
    password: String,
    #[serde(default)]
    jwt_secret: Option<String>,
    service_account_token: String,
}

impl From<CompleteSetupRequest> for CompleteSetupCommand {
    fn from(request: CompleteSetupRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            signing_secret: request.jwt_secret,
            access_token: request.service_account_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupResponse {
    pub message: String,
    pub reloaded: bool,
}
