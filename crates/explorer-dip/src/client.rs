//! HTTP client for the DIP REST API.

use std::time::Duration;

use explorer_core::config::BundestagSettings;
use explorer_core::{Error, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::dataset::Dataset;
use crate::document::SearchPage;
use crate::params::{ParamValue, QueryParams, CURSOR};
use crate::person::{PersonPage, PersonRef};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Filter DIP's person listing matches names against.
const PERSON_NAME_FILTER: &str = "f.person";

#[derive(Debug, Clone)]
pub struct DipClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl DipClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn from_settings(settings: &BundestagSettings) -> Result<Self> {
        Self::new(&settings.base_url, settings.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Raw GET against `<base_url>/<endpoint>`.
    async fn request(&self, endpoint: &str, params: &QueryParams) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut query = vec![("format".to_string(), "json".to_string())];
        query.extend(params.to_query_pairs());

        debug!("DIP GET {} ({} params)", url, query.len());

        let mut req = self.http.get(&url).query(&query);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("ApiKey {}", key));
        }

        let response = req.send().await.map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status,
                message: body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Http(format!("Invalid DIP response: {}", e)))
    }

    /// One page of a dataset listing, as DIP returned it.
    pub async fn list_documents(&self, dataset: Dataset, params: &QueryParams) -> Result<Value> {
        self.request(dataset.as_str(), params).await
    }

    /// One page of a dataset listing, decoded.
    pub async fn search(&self, dataset: Dataset, params: &QueryParams) -> Result<SearchPage> {
        let raw = self.list_documents(dataset, params).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// A single record by id.
    pub async fn get_document(&self, dataset: Dataset, id: &str) -> Result<Value> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(Error::Validation(format!("Ungültige Dokument-ID: {}", id)));
        }
        self.request(&format!("{}/{}", dataset.as_str(), id), &QueryParams::new())
            .await
    }

    /// Person directory lookup by name.
    pub async fn search_persons(&self, query: &str, cursor: Option<&str>) -> Result<PersonPage> {
        let mut params = QueryParams::new();
        params.insert(PERSON_NAME_FILTER, ParamValue::text(query.trim()));
        if let Some(c) = cursor.filter(|c| !c.is_empty()) {
            params.insert(CURSOR, ParamValue::text(c));
        }

        let raw = self.request("person", &params).await?;
        let options = raw
            .get("documents")
            .and_then(Value::as_array)
            .map(|docs| docs.iter().filter_map(PersonRef::from_dip).collect())
            .unwrap_or_default();
        let cursor = raw.get("cursor").and_then(Value::as_str).map(String::from);

        Ok(PersonPage { options, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};

    /// What the mock DIP server saw.
    #[derive(Default)]
    struct Captured {
        query: Mutex<Option<String>>,
        auth: Mutex<Option<String>>,
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn capture_router(captured: Arc<Captured>, body: Value) -> Router {
        Router::new()
            .route(
                "/{endpoint}",
                get(
                    move |State(c): State<Arc<Captured>>, headers: HeaderMap, RawQuery(q): RawQuery| {
                        let body = body.clone();
                        async move {
                            *c.query.lock().unwrap() = q;
                            *c.auth.lock().unwrap() = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(String::from);
                            Json(body)
                        }
                    },
                ),
            )
            .with_state(captured)
    }

    #[tokio::test]
    async fn test_search_sends_repeated_keys_and_key_header() {
        let captured = Arc::new(Captured::default());
        let body = serde_json::json!({
            "numFound": 3,
            "cursor": "next",
            "documents": [{"id": "1", "titel": "A"}],
        });
        let base = spawn(capture_router(captured.clone(), body)).await;

        let client = DipClient::new(&format!("{}/", base), Some("k123".into())).unwrap();
        let mut params = QueryParams::new();
        params.insert("f.wahlperiode", ParamValue::ints([19, 20]));
        let page = client.search(Dataset::Vorgang, &params).await.unwrap();

        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.cursor.as_deref(), Some("next"));
        assert_eq!(page.num_found, Some(3));

        let query = captured.query.lock().unwrap().clone().unwrap();
        assert!(query.contains("format=json"));
        assert!(query.contains("f.wahlperiode=19"));
        assert!(query.contains("f.wahlperiode=20"));
        assert_eq!(captured.auth.lock().unwrap().as_deref(), Some("ApiKey k123"));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status() {
        let router = Router::new().route(
            "/{endpoint}",
            get(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base = spawn(router).await;
        let client = DipClient::new(&base, None).unwrap();

        let err = client
            .search(Dataset::Drucksache, &QueryParams::new())
            .await
            .unwrap_err();
        match err {
            Error::Upstream { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_persons_maps_records() {
        let captured = Arc::new(Captured::default());
        let body = serde_json::json!({
            "documents": [
                {"id": "11", "titel": "Erika Muster", "person_roles": [{"fraktion": "SPD"}]},
                {"titel": "ohne id"},
            ],
            "cursor": "p2",
        });
        let base = spawn(capture_router(captured.clone(), body)).await;
        let client = DipClient::new(&base, None).unwrap();

        let page = client.search_persons(" Muster ", None).await.unwrap();
        assert_eq!(page.options.len(), 1);
        assert_eq!(page.options[0].fraktion.as_deref(), Some("SPD"));
        assert_eq!(page.cursor.as_deref(), Some("p2"));

        let query = captured.query.lock().unwrap().clone().unwrap();
        assert!(query.contains("f.person=Muster"));
        assert!(captured.auth.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_document_rejects_path_ids() {
        let client = DipClient::new("http://127.0.0.1:9", None).unwrap();
        let err = client.get_document(Dataset::Vorgang, "../x").await.unwrap_err();
        assert!(err.is_client_error());
    }
}
