use axum::http::header;
use axum::http::HeaderMap;
use url::Url;

/// Whether the request's `Origin` (or the origin of its `Referer`) is in
/// `allowed` or matches the request's own `Host`.
pub fn origin_allowed(headers: &HeaderMap, allowed: &[String]) -> bool {
    let Some(origin) = request_origin(headers) else {
        return false;
    };

    if allowed
        .iter()
        .any(|candidate| candidate.trim_end_matches('/') == origin)
    {
        return true;
    }

    let host = headers.get(header::HOST).and_then(|value| value.to_str().ok());
    match (host, Url::parse(&origin)) {
        (Some(host), Ok(url)) => authority(&url).is_some_and(|authority| authority == host),
        _ => false,
    }
}

fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && *value != "null")
    {
        return Some(origin.trim_end_matches('/').to_string());
    }

    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let url = Url::parse(referer).ok()?;
    match url.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_allowed_origin_list() {
        let allowed = vec!["https://dashboard.example.com/".to_string()];

        assert!(origin_allowed(
            &headers(&[(header::ORIGIN, "https://dashboard.example.com")]),
            &allowed
        ));
        assert!(!origin_allowed(
            &headers(&[(header::ORIGIN, "https://evil.example.com")]),
            &allowed
        ));
    }

    #[test]
    fn test_same_host_origin() {
        assert!(origin_allowed(
            &headers(&[
                (header::ORIGIN, "http://127.0.0.1:8080"),
                (header::HOST, "127.0.0.1:8080"),
            ]),
            &[]
        ));
        assert!(!origin_allowed(
            &headers(&[
                (header::ORIGIN, "http://127.0.0.1:9999"),
                (header::HOST, "127.0.0.1:8080"),
            ]),
            &[]
        ));
    }

    #[test]
    fn test_referer_fallback() {
        let allowed = vec!["https://dashboard.example.com".to_string()];

        assert!(origin_allowed(
            &headers(&[(header::REFERER, "https://dashboard.example.com/setup?step=2")]),
            &allowed
        ));
    }

    #[test]
    fn test_missing_origin_and_referer_rejected() {
        assert!(!origin_allowed(
            &headers(&[(header::HOST, "127.0.0.1:8080")]),
            &["http://127.0.0.1:8080".to_string()]
        ));
    }
}
