use axum::extract::State;
use axum::Json;

use super::ApiError;
use crate::domain::setup::models::SetupStatus;
use crate::inbound::http::router::AppState;

pub async fn setup_status(State(state): State<AppState>) -> Result<Json<SetupStatus>, ApiError> {
    state
        .setup_service
        .check_status()
        .await
        .map(Json)
        .map_err(ApiError::from)
}
