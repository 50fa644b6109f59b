use std::str::FromStr;

use auth::IdentityProvider;
use auth::Role;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::auth::models::LoginCommand;
use crate::inbound::http::router::AppState;
use crate::inbound::http::session::session_cookie;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let snapshot = state.runtime.current().await;
    let auth_service = snapshot.ready().ok_or_else(ApiError::setup_required)?;

    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let command = body.try_into_command()?;

    let outcome = auth_service.login(&command).await.map_err(ApiError::from)?;

    let jar = jar.add(session_cookie(outcome.token, outcome.expires_at));
    Ok((jar, Json(LoginResponse { role: outcome.role })))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
    #[serde(default)]
    idp: Option<String>,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let identity_provider = match self.idp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(idp) => Some(IdentityProvider::from_str(idp).map_err(ApiError::BadRequest)?),
        };
        Ok(LoginCommand::new(self.username, self.password, identity_provider))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(idp: Option<&str>) -> LoginRequest {
        LoginRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
            idp: idp.map(str::to_string),
        }
    }

    #[test]
    fn test_identity_provider_hint_parsing() {
        assert_eq!(request(None).try_into_command().unwrap().identity_provider, None);
        assert_eq!(request(Some("")).try_into_command().unwrap().identity_provider, None);
        assert_eq!(
            request(Some("ldap")).try_into_command().unwrap().identity_provider,
            Some(IdentityProvider::Ldap)
        );
        assert!(matches!(
            request(Some("saml")).try_into_command(),
            Err(ApiError::BadRequest(_))
        ));
    }
}
