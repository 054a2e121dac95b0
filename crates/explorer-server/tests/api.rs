//! API tests: drive the real router in-process and check the response
//! shapes the browser console relies on.
//!
//! DIP and Gemini are replaced by small axum servers on loopback.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use explorer_core::ServerConfig;
use explorer_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// An address nothing listens on; any DIP call ends in a transport error.
const DEAD_DIP: &str = "http://127.0.0.1:9";

fn state_in(dir: &tempfile::TempDir, stored: Option<Value>) -> Arc<AppState> {
    let config = ServerConfig::from_env(dir.path()).unwrap();
    if let Some(stored) = &stored {
        std::fs::write(&config.data_paths.settings_file, stored.to_string()).unwrap();
    }
    let state = AppState::new(config).unwrap();
    {
        // Keep the tests independent of keys in the environment.
        let mut settings = state.settings.write();
        if stored.is_none() {
            settings.gemini.api_key = None;
            settings.bundestag.api_key = None;
        }
        settings.bundestag.base_url = DEAD_DIP.into();
    }
    Arc::new(state)
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Mock DIP that answers every listing with `body` and records the query.
async fn mock_dip(body: Value) -> (String, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route(
            "/{*path}",
            get(move |State(seen): State<Arc<Mutex<Vec<String>>>>, RawQuery(q): RawQuery| {
                let body = body.clone();
                async move {
                    seen.lock().unwrap().push(q.unwrap_or_default());
                    Json(body)
                }
            }),
        )
        .with_state(seen.clone());
    (spawn(router).await, seen)
}

// ---------------------------------------------------------------
// Health and settings
// ---------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    let (status, body) = send(&state, get_req("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_config_masks_keys() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(
        &dir,
        Some(json!({"gemini": {"api_key": "secretkey123"}, "bundestag": {"api_key": "abc"}})),
    );

    let (status, body) = send(&state, get_req("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["gemini"]["api_key"].is_null());
    assert_eq!(body["gemini"]["has_api_key"], true);
    assert_eq!(body["gemini"]["api_key_preview"], "sec***23");
    assert_eq!(body["bundestag"]["api_key_preview"], "***");
    assert_eq!(body["gemini"]["model"], "gemini-2.5-pro");
    assert_eq!(body["ui"]["preferred_language"], "de");
    assert!(!body.to_string().contains("secretkey123"));
}

#[tokio::test]
async fn test_empty_config_update_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);

    let (status, body) = send(&state, post_json("/api/config", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Keine Änderungen übermittelt.");

    let (status, _) = send(&state, post_json("/api/config", json!({"gemini": {}, "ui": {}}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_update_persists_and_clears_key() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, Some(json!({"gemini": {"api_key": "secretkey123"}})));

    let (status, body) = send(
        &state,
        post_json(
            "/api/config",
            json!({"gemini": {"api_key": "", "temperature": 0.8}, "ui": {"preferred_language": "en"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gemini"]["has_api_key"], false);
    assert!(body["gemini"]["api_key_preview"].is_null());
    assert_eq!(body["gemini"]["temperature"], 0.8);
    assert_eq!(body["ui"]["preferred_language"], "en");
    // Untouched fields keep their values.
    assert_eq!(body["ui"]["default_gemini_task"], "summary");

    let stored: Value = serde_json::from_str(
        &std::fs::read_to_string(&state.config.data_paths.settings_file).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["ui"]["preferred_language"], "en");
    assert!(stored["gemini"]["api_key"].is_null());
}

// ---------------------------------------------------------------
// DIP proxy
// ---------------------------------------------------------------

#[tokio::test]
async fn test_search_unknown_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    let (status, body) = send(
        &state,
        post_json("/api/bundestag/search", json!({"dataset": "gesetz", "params": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("gesetz"));
}

#[tokio::test]
async fn test_search_passes_through() {
    let dip_body = json!({"numFound": 1, "cursor": "AoE", "documents": [{"id": "42", "titel": "Haushalt"}]});
    let (base, seen) = mock_dip(dip_body.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    state.settings.write().bundestag.base_url = base;

    let (status, body) = send(
        &state,
        post_json(
            "/api/bundestag/search",
            json!({"dataset": "drucksache", "params": {"f.titel": ["Haushalt"], "f.wahlperiode": [20], "f.datum.start": ""}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, dip_body);

    let query = seen.lock().unwrap()[0].clone();
    assert!(query.contains("format=json"));
    assert!(query.contains("f.titel=Haushalt"));
    assert!(query.contains("f.wahlperiode=20"));
    assert!(!query.contains("f.datum.start"));
}

#[tokio::test]
async fn test_search_upstream_failure_is_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    let (status, body) = send(
        &state,
        post_json("/api/bundestag/search", json!({"dataset": "vorgang"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_document_route() {
    let (base, _) = mock_dip(json!({"id": "7", "titel": "Einzeldokument"})).await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    state.settings.write().bundestag.base_url = base;

    let (status, body) = send(&state, get_req("/api/bundestag/vorgang/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["titel"], "Einzeldokument");

    let (status, _) = send(&state, get_req("/api/bundestag/unbekannt/7")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_options_catalogue() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    let (status, body) = send(&state, get_req("/api/bundestag/options")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wahlperioden"].as_array().unwrap().len(), 21);
    assert!(body["vorgangstypen"].is_array());
    assert!(body["initiativen"].is_array());
}

#[tokio::test]
async fn test_short_person_query_skips_dip() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    // DIP is unreachable, so any call would surface as 502.
    let (status, body) = send(&state, get_req("/api/bundestag/persons?q=%20a%20")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["options"], json!([]));
}

#[tokio::test]
async fn test_person_lookup() {
    let (base, seen) = mock_dip(json!({
        "documents": [{"id": "11", "vorname": "Erika", "nachname": "Muster", "fraktion": "SPD"}],
        "cursor": "next",
    }))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    state.settings.write().bundestag.base_url = base;

    let (status, body) = send(&state, get_req("/api/bundestag/persons?q=Muster")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["options"][0]["title"], "Erika Muster");
    assert_eq!(body["cursor"], "next");
    assert!(seen.lock().unwrap()[0].contains("f.person=Muster"));
}

// ---------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------

#[tokio::test]
async fn test_gemini_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    let (status, body) = send(
        &state,
        post_json("/api/gemini", json!({"text": "  \n", "task": "summary"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Kein Text zur Verarbeitung übermittelt.");
}

#[tokio::test]
async fn test_gemini_missing_key() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);
    let (status, body) = send(
        &state,
        post_json("/api/gemini", json!({"text": "Inhalt", "task": "summary"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Es ist kein Gemini API-Key hinterlegt.");
}

#[tokio::test]
async fn test_gemini_round_trip() {
    let prompts = Arc::new(Mutex::new(Vec::<Value>::new()));
    let router = Router::new()
        .route(
            "/models/{call}",
            post(|State(p): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                p.lock().unwrap().push(body);
                Json(json!({"candidates": [
                    {"content": {"parts": [{"text": "Punkt 1"}]}},
                    {"content": {"parts": [{"text": "Punkt A"}]}},
                ]}))
            }),
        )
        .with_state(prompts.clone());
    let base = spawn(router).await;

    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::from_env(dir.path()).unwrap();
    std::fs::write(
        &config.data_paths.settings_file,
        json!({"gemini": {"api_key": "gkey-123456"}}).to_string(),
    )
    .unwrap();
    let state = Arc::new(AppState::new(config).unwrap().with_gemini_base_url(base));

    let (status, body) = send(
        &state,
        post_json(
            "/api/gemini",
            json!({"text": "Inhalt", "task": "bullet_points", "options": {"language": "en", "tone": "neutral"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"text": "Punkt 1", "candidates": ["Punkt 1", "Punkt A"]}));

    let sent = prompts.lock().unwrap()[0].clone();
    let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap().to_string();
    assert!(prompt.starts_with("Fasse die wichtigsten Inhalte in prägnanten Stichpunkten in en zusammen."));
    assert!(prompt.contains("\nTonfall: neutral."));
    assert_eq!(sent["generationConfig"]["temperature"], 0.3);
}

// ---------------------------------------------------------------
// CORS
// ---------------------------------------------------------------

#[tokio::test]
async fn test_cors_allows_configured_origin_only() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_in(&dir, None);

    let allowed = Request::get("/api/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = build_router(state.clone()).oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );

    let foreign = Request::get("/api/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = build_router(state).oneshot(foreign).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
