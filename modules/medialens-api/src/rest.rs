use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::info;

use crate::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the media extraction API";
pub const NO_URLS_MESSAGE: &str = "No URLs provided";

#[derive(Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    urls: Option<Vec<String>>,
}

/// Liveness check and welcome payload.
pub async fn home() -> impl IntoResponse {
    Json(serde_json::json!({ "message": WELCOME_MESSAGE }))
}

/// Batch extraction endpoint. A missing or empty `urls` field fails the whole
/// request; anything that goes wrong per URL lands in that URL's result
/// object instead.
pub async fn api_extract(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExtractRequest>,
) -> impl IntoResponse {
    let urls = body.urls.unwrap_or_default();
    if urls.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": NO_URLS_MESSAGE })),
        )
            .into_response();
    }

    info!(count = urls.len(), "Extraction batch received");
    let results = state.dispatcher.run(urls).await;

    let failures = results.iter().filter(|r| r.is_failure()).count();
    info!(count = results.len(), failures, "Extraction batch complete");

    Json(results).into_response()
}
