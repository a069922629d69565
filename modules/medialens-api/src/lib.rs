pub mod classify;
pub mod extract;
pub mod resolve;
pub mod rest;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use extract::Dispatcher;

pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// Build the HTTP router: welcome/liveness endpoint plus the batch extraction
/// endpoint, with the CORS and request-tracing layers applied.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(rest::home))
        .route("/extract", post(rest::api_extract))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
