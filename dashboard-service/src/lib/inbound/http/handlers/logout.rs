use axum::Json;
use axum_extra::extract::CookieJar;
use serde_json::json;
use serde_json::Value;

use crate::inbound::http::session::expired_session_cookie;

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(expired_session_cookie()),
        Json(json!({ "message": "Logged out" })),
    )
}
