use std::time::Duration;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, header},
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::AppConfig,
    middleware::session::{AppSessionStore, create_session_layer},
    response::MessageResponse,
    routes::{create_api_router, doc::scalar_docs, health},
    state::AppState,
};

const MAX_IN_FLIGHT_REQUESTS: usize = 100;

/// Assembles the full HTTP application: API routes, docs and the middleware
/// stack. Binding and serving are left to the caller.
pub fn build_app(
    state: AppState,
    config: &AppConfig,
    store: AppSessionStore,
) -> anyhow::Result<Router> {
    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|_request: &Request<_>, _span: &tracing::Span| {
            tracing::debug!("request started");
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(scalar_docs())
        .fallback(not_found)
        .layer(create_session_layer(store, config))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(cors_layer(config)?)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
        .with_state(state);

    Ok(app)
}

/// Only the configured frontend origin may call the API from a browser, and
/// it may send the session cookie along.
fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let Some(origin) = config.frontend_origin.as_deref() else {
        return Ok(CorsLayer::new());
    };
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("FRONTEND_ORIGIN is not a valid header value: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<MessageResponse>) {
    let body = MessageResponse::failure(format!("Not found: {}", uri.path()));
    (StatusCode::NOT_FOUND, Json(body))
}
