use axum::http::header;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;
use chrono::DateTime;
use chrono::Utc;
use time::OffsetDateTime;

pub const SESSION_COOKIE: &str = "token";
const TOKEN_QUERY_PARAM: &str = "token";

/// Find the session token: bearer header, then `?token=`, then the cookie.
pub fn extract_token(headers: &HeaderMap, query: Option<&str>, jar: &CookieJar) -> Option<String> {
    bearer_token(headers)
        .or_else(|| query.and_then(query_token))
        .or_else(|| {
            jar.get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .filter(|token| !token.is_empty())
        })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn query_token(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

/// Session cookie expiring together with the token.
pub fn session_cookie(token: String, expires_at: DateTime<Utc>) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/");

    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        cookie = cookie.expires(expires);
    }

    cookie.build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(time::Duration::seconds(-1))
        .build()
}
