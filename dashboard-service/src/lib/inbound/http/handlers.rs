use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::auth::errors::AuthError;
use crate::domain::setup::errors::SetupError;

pub mod change_password;
pub mod login;
pub mod logout;
pub mod me;
pub mod setup_complete;
pub mod setup_status;
pub mod setup_token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    PreconditionFailed(String),
}

impl ApiError {
    pub fn setup_required() -> Self {
        Self::PreconditionFailed("Setup required".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::PreconditionFailed(msg) => (StatusCode::PRECONDITION_FAILED, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
            AuthError::Unauthorized => ApiError::Unauthorized("Unauthorized".to_string()),
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<SetupError> for ApiError {
    fn from(err: SetupError) -> Self {
        match err {
            SetupError::Validation(msg) => ApiError::BadRequest(msg),
            SetupError::AlreadyConfigured => ApiError::Forbidden(err.to_string()),
            SetupError::PermissionDenied(_) => {
                tracing::warn!(error = %err, "Setup write denied by cluster");
                ApiError::Forbidden(
                    "Permission denied; check the service account token's RBAC".to_string(),
                )
            }
            SetupError::NotInSetup => ApiError::PreconditionFailed(err.to_string()),
            SetupError::Configuration(_) | SetupError::Store(_) | SetupError::Internal(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}
