//! Settings routes. API keys never leave the server; the view carries a
//! masked preview instead.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use explorer_core::config::{SettingsUpdate, SettingsView};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/config", get(get_config).post(update_config))
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<SettingsView> {
    Json(state.settings.read().to_view())
}

/// Partial update; the file is written before the new view is returned.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<SettingsView>> {
    let mut settings = state.settings.write();
    let mut next = settings.clone();
    next.apply_update(&update)?;
    next.save()?;
    *settings = next;
    Ok(Json(settings.to_view()))
}
