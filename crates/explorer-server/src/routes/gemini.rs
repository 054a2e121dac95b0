//! Gemini task route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use explorer_core::{Error, GenerationResult};
use explorer_gemini::workspace::EMPTY_TEXT_MESSAGE;
use explorer_gemini::{GeminiRequest, GenerationBackend};
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/gemini", post(run_task))
}

/// Blank text is rejected before the key is even looked at.
async fn run_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GeminiRequest>,
) -> ApiResult<Json<GenerationResult>> {
    if req.text.trim().is_empty() {
        return Err(Error::Validation(EMPTY_TEXT_MESSAGE.into()).into());
    }
    let client = state.gemini_client()?;
    info!("Gemini task {} on model {}", req.task, client.model());
    Ok(Json(client.generate(&req).await?))
}
