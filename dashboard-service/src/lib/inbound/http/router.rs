use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::setup_complete::setup_complete;
use super::handlers::setup_status::setup_status;
use super::handlers::setup_token::setup_token;
use super::middleware::require_allowed_origin;
use super::middleware::require_session;
use super::runtime::ServiceRuntime;
use crate::domain::setup::ports::ServiceReloader;
use crate::domain::setup::service::SetupService;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ServiceRuntime>,
    pub setup_service: Arc<SetupService>,
    pub allowed_origins: Arc<Vec<String>>,
}

pub fn create_router(runtime: Arc<ServiceRuntime>, allowed_origins: Vec<String>) -> Router {
    let reloader: Arc<dyn ServiceReloader> = runtime.clone();
    let setup_service = Arc::new(SetupService::new(runtime.credentials().clone(), reloader));
    let cors_layer = cors_layer(&allowed_origins);

    let state = AppState {
        runtime,
        setup_service,
        allowed_origins: Arc::new(allowed_origins),
    };

    let public_routes = Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/setup/status", get(setup_status));

    let setup_routes = Router::new()
        .route("/api/setup/complete", post(setup_complete))
        .route("/api/setup/token", post(setup_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_allowed_origin,
        ));

    let protected_routes = Router::new()
        .route("/api/me", get(me))
        .route("/api/auth/change-password", post(change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Headers are left out of the span; they carry session tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(setup_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(cors_layer)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim_end_matches('/')) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid allowed origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
