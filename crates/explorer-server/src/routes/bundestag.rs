//! DIP proxy routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use explorer_dip::{Dataset, MetadataOptions, PersonPage, QueryParams};
use explorer_search::MIN_QUERY_CHARS;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bundestag/search", post(search))
        .route("/bundestag/options", get(options))
        .route("/bundestag/persons", get(persons))
        .route("/bundestag/{dataset}/{id}", get(document))
}

#[derive(Debug, Deserialize)]
struct DatasetRequest {
    dataset: String,
    #[serde(default)]
    params: Map<String, Value>,
}

// ---------------------------------------------------------------
// Listings
// ---------------------------------------------------------------

/// One page of a dataset, passed through as DIP returned it.
async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DatasetRequest>,
) -> ApiResult<Json<Value>> {
    let dataset: Dataset = req.dataset.parse()?;
    let params = QueryParams::from_json_map(&req.params);
    let client = state.dip_client()?;
    Ok(Json(client.list_documents(dataset, &params).await?))
}

async fn document(
    State(state): State<Arc<AppState>>,
    Path((dataset, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let dataset: Dataset = dataset.parse()?;
    let client = state.dip_client()?;
    Ok(Json(client.get_document(dataset, &id).await?))
}

// ---------------------------------------------------------------
// Filter metadata
// ---------------------------------------------------------------

async fn options() -> Json<MetadataOptions> {
    Json(MetadataOptions::catalogue())
}

#[derive(Debug, Deserialize)]
struct PersonQuery {
    #[serde(default)]
    q: String,
    cursor: Option<String>,
}

/// Person suggestions. Short queries answer empty without contacting DIP.
async fn persons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PersonQuery>,
) -> ApiResult<Json<PersonPage>> {
    if query.q.trim().chars().count() < MIN_QUERY_CHARS {
        return Ok(Json(PersonPage::default()));
    }
    let client = state.dip_client()?;
    let page = client
        .search_persons(&query.q, query.cursor.as_deref())
        .await?;
    Ok(Json(page))
}
