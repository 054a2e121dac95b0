//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use explorer_core::config::GeminiSettings;
use explorer_core::{Error, GenerationResult, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::prompt::build_prompt;
use crate::types::GeminiRequest;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub const MISSING_KEY_MESSAGE: &str = "Es ist kein Gemini API-Key hinterlegt.";

/// Runs one task request against a generation model.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GeminiRequest) -> Result<GenerationResult>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    settings: GeminiSettings,
    default_language: String,
}

impl GeminiClient {
    /// Fails with [`Error::MissingApiKey`] when no key is configured.
    pub fn new(settings: &GeminiSettings, default_language: &str) -> Result<Self> {
        Self::with_base_url(GEMINI_BASE_URL, settings, default_language)
    }

    pub fn with_base_url(base_url: &str, settings: &GeminiSettings, default_language: &str) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::MissingApiKey(MISSING_KEY_MESSAGE.into()))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            settings: settings.clone(),
            default_language: default_language.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Single non-streaming call with a finished prompt.
    pub async fn generate_content(&self, prompt: &str, temperature: f64) -> Result<GenerationResult> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.settings.model);
        let body = json!({
            "systemInstruction": {"parts": [{"text": self.settings.system_prompt}]},
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": temperature},
        });

        debug!("Gemini request to model {} ({} prompt chars)", self.settings.model, prompt.len());

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status,
                message: error_message(&body),
            });
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("Invalid Gemini response: {}", e)))?;
        Ok(parse_response(&parsed))
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, request: &GeminiRequest) -> Result<GenerationResult> {
        let prompt = build_prompt(request.task, &request.text, &request.options, &self.default_language);
        let temperature = request.options.temperature.unwrap_or(self.settings.temperature);
        self.generate_content(&prompt, temperature).await
    }
}

/// Google wraps errors as `{"error": {"message": ...}}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

fn candidate_text(candidate: &Value) -> String {
    candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

fn parse_response(body: &Value) -> GenerationResult {
    let candidates: Vec<String> = body["candidates"]
        .as_array()
        .map(|list| list.iter().map(candidate_text).collect())
        .unwrap_or_default();

    let text = candidates.first().cloned().unwrap_or_default();
    if text.is_empty() {
        let reason = body["promptFeedback"]["blockReason"].as_str().unwrap_or("none");
        warn!("Gemini returned no text (block reason: {})", reason);
    }

    GenerationResult {
        text,
        candidates: candidates.into_iter().filter(|c| !c.is_empty()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    use crate::types::{GeminiTask, TaskOptions};

    #[derive(Default)]
    struct Seen {
        path: Mutex<Option<String>>,
        key: Mutex<Option<String>>,
        body: Mutex<Option<Value>>,
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn settings(key: Option<&str>) -> GeminiSettings {
        GeminiSettings {
            api_key: key.map(String::from),
            model: "gemini-test".into(),
            system_prompt: "Sei hilfreich.".into(),
            temperature: 0.3,
        }
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = GeminiClient::new(&settings(None), "de").unwrap_err();
        assert!(matches!(err, Error::MissingApiKey(_)));
        assert_eq!(err.to_string(), MISSING_KEY_MESSAGE);
        assert!(GeminiClient::new(&settings(Some("  ")), "de").is_err());
    }

    #[test]
    fn test_parse_response_candidates() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "Teil 1, "}, {"text": "Teil 2"}]}},
                {"content": {"parts": []}},
                {"content": {"parts": [{"text": "Alternative"}]}},
            ]
        });
        let result = parse_response(&body);
        assert_eq!(result.text, "Teil 1, Teil 2");
        assert_eq!(result.candidates, vec!["Teil 1, Teil 2".to_string(), "Alternative".to_string()]);
    }

    #[test]
    fn test_parse_response_blocked() {
        let result = parse_response(&json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(result.text.is_empty());
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_generate_request_shape() {
        let seen = Arc::new(Seen::default());
        let router = Router::new()
            .route(
                "/models/{call}",
                post(
                    |State(s): State<Arc<Seen>>, Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        *s.path.lock().unwrap() = Some(call);
                        *s.key.lock().unwrap() = headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(String::from);
                        *s.body.lock().unwrap() = Some(body);
                        Json(json!({"candidates": [{"content": {"parts": [{"text": "Kurzfassung"}]}}]}))
                    },
                ),
            )
            .with_state(seen.clone());
        let base = spawn(router).await;

        let client = GeminiClient::with_base_url(&base, &settings(Some("g-key")), "de").unwrap();
        let request = GeminiRequest {
            text: "Langer Text".into(),
            task: GeminiTask::Summary,
            options: TaskOptions {
                temperature: Some(0.9),
                ..Default::default()
            },
        };
        let result = client.generate(&request).await.unwrap();
        assert_eq!(result.text, "Kurzfassung");

        assert_eq!(seen.path.lock().unwrap().as_deref(), Some("gemini-test:generateContent"));
        assert_eq!(seen.key.lock().unwrap().as_deref(), Some("g-key"));
        let body = seen.body.lock().unwrap().clone().unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Sei hilfreich.");
        assert_eq!(body["generationConfig"]["temperature"], 0.9);
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.starts_with("Erstelle eine kurze, gut strukturierte Zusammenfassung in de."));
        assert!(prompt.ends_with("Text:\nLanger Text"));
    }

    #[tokio::test]
    async fn test_upstream_error_message_extracted() {
        let router = Router::new().route(
            "/models/{call}",
            post(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": {"code": 403, "message": "API key not valid"}})),
                )
            }),
        );
        let base = spawn(router).await;
        let client = GeminiClient::with_base_url(&base, &settings(Some("bad")), "de").unwrap();

        let err = client.generate_content("x", 0.3).await.unwrap_err();
        match err {
            Error::Upstream { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
