//! Gemini `generateContent` classifier

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_verdict, Classifier, ClassifierError, Verdict};
use crate::config::Config;

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct GeminiClassifier {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClassifier {
    pub fn from_config(config: &Config) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.classifier_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn endpoint(&self) -> Result<Url, ClassifierError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model);
        Url::parse(&url).map_err(|e| {
            ClassifierError::Transport(format!("invalid classifier endpoint {}: {}", url, e))
        })
    }

    fn build_request(&self, line: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: build_prompt(line) }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }
}

#[axum::async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    fn ready(&self) -> Result<(), ClassifierError> {
        if self.api_key.is_none() {
            return Err(ClassifierError::MissingCredential);
        }
        self.endpoint().map(|_| ())
    }

    async fn classify(&self, line: &str) -> Result<Verdict, ClassifierError> {
        let api_key = self.api_key.as_deref().ok_or(ClassifierError::MissingCredential)?;

        let response = self.client
            .post(self.endpoint()?)
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(line))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status { status: status.as_u16(), body });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        let text = body.text().ok_or(ClassifierError::EmptyResponse)?;
        tracing::debug!("Classifier response for {:?}: {}", line, text);

        parse_verdict(&text)
    }
}

fn build_prompt(line: &str) -> String {
    format!(
        "Analyze the following user comment for guideline violations. \
         Your response must be a single JSON object. The comment is: \"{}\".",
        line
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "decision": {
                "type": "STRING",
                "enum": ["ALLOW", "FLAG", "BLOCK"],
                "description": "Your final verdict."
            },
            "reason": {
                "type": "STRING",
                "description": "A brief explanation for your decision."
            },
            "categories": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Violation categories like SPAM, HATE_SPEECH, etc. If none, return an empty array."
            },
            "problematicPhrase": {
                "type": "STRING",
                "description": "The exact phrase that is problematic. If none, this can be omitted."
            }
        },
        "required": ["decision", "reason", "categories"]
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::post,
        Json, Router,
    };
    use parking_lot::Mutex;

    use super::*;
    use crate::classifier::classify_batch;
    use crate::models::Decision;

    fn classifier(api_key: Option<&str>, api_base: &str) -> GeminiClassifier {
        let config = Config {
            api_key: api_key.map(str::to_string),
            api_base: api_base.to_string(),
            ..Default::default()
        };
        GeminiClassifier::from_config(&config).unwrap()
    }

    #[test]
    fn test_missing_key_is_not_ready() {
        let c = classifier(None, "https://generativelanguage.googleapis.com");
        assert!(matches!(c.ready(), Err(ClassifierError::MissingCredential)));
    }

    #[test]
    fn test_bad_endpoint_is_transport_error() {
        let c = classifier(Some("key"), "not a url");
        assert!(matches!(c.ready(), Err(ClassifierError::Transport(_))));
    }

    #[test]
    fn test_ready_with_key() {
        let c = classifier(Some("key"), "https://generativelanguage.googleapis.com");
        assert!(c.ready().is_ok());
        assert_eq!(
            c.endpoint().unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let c = classifier(Some("key"), "https://generativelanguage.googleapis.com");
        let body = serde_json::to_value(c.build_request("You're an idiot")).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.ends_with("The comment is: \"You're an idiot\"."));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["decision", "reason", "categories"])
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"decision\":" }, { "text": "\"ALLOW\"}" }] }
            }]
        }))
        .unwrap();

        assert_eq!(body.text().as_deref(), Some("{\"decision\":\"ALLOW\"}"));
    }

    #[test]
    fn test_response_without_text() {
        let empty: GenerateResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(empty.text().is_none());

        let blocked: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(blocked.text().is_none());
    }

    // ------------------------------------------------------------------------
    // Local stand-in for the Gemini API
    // ------------------------------------------------------------------------

    type SeenKeys = Arc<Mutex<Vec<String>>>;

    async fn stub_generate(
        State(keys): State<SeenKeys>,
        Path(call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        if let Some(key) = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) {
            keys.lock().push(key.to_string());
        }
        if call != "gemini-2.5-flash:generateContent" {
            return StatusCode::NOT_FOUND.into_response();
        }

        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
        if prompt.contains("quota") {
            return (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded").into_response();
        }
        if prompt.contains("html") {
            return (StatusCode::OK, "<html>maintenance</html>").into_response();
        }

        let text = if prompt.contains("garbled") {
            "I am unable to produce JSON today.".to_string()
        } else {
            json!({
                "decision": "BLOCK",
                "reason": "insult",
                "categories": ["HARASSMENT"],
                "problematicPhrase": "idiot"
            })
            .to_string()
        };

        Json(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })).into_response()
    }

    async fn serve_stub() -> (String, SeenKeys) {
        let keys = SeenKeys::default();
        let app = Router::new()
            .route("/v1beta/models/:call", post(stub_generate))
            .with_state(keys.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), keys)
    }

    #[tokio::test]
    async fn test_classify_over_http() {
        let (base, keys) = serve_stub().await;
        let c = classifier(Some("k1"), &base);

        let verdict = c.classify("You're an idiot").await.unwrap();
        assert_eq!(verdict.decision, Decision::Block);
        assert_eq!(verdict.reason, "insult");
        assert_eq!(verdict.categories, vec!["HARASSMENT"]);
        assert_eq!(verdict.problematic_phrase.as_deref(), Some("idiot"));

        let err = c.classify("garbled reply please").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Parse(_)), "{:?}", err);

        assert_eq!(*keys.lock(), vec!["k1", "k1"]);
    }

    #[tokio::test]
    async fn test_classify_http_error_status() {
        let (base, _) = serve_stub().await;
        let c = classifier(Some("k1"), &base);

        match c.classify("over quota").await {
            Err(ClassifierError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_classify_non_json_reply() {
        let (base, _) = serve_stub().await;
        let c = classifier(Some("k1"), &base);

        let err = c.classify("html page").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Parse(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_unknown_model_is_status_error() {
        let (base, _) = serve_stub().await;
        let config = Config {
            api_key: Some("k1".to_string()),
            api_base: base,
            model: "other-model".to_string(),
            ..Default::default()
        };
        let c = GeminiClassifier::from_config(&config).unwrap();

        let err = c.classify("hello").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Status { status: 404, .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_refused_connection_becomes_fallback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = classifier(Some("k1"), &format!("http://{}", addr));
        assert!(c.ready().is_ok());

        let err = c.classify("hello").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Transport(_)), "{:?}", err);

        let results = classify_batch(Arc::new(c), &["hello".to_string()]).await.unwrap();
        assert_eq!(results, vec![crate::models::AnalysisResult::fallback("hello")]);
    }

    #[tokio::test]
    async fn test_batch_over_http_mixes_verdicts_and_fallbacks() {
        let (base, _) = serve_stub().await;
        let c = classifier(Some("k1"), &base);
        let lines: Vec<String> = ["You're an idiot", "over quota", "garbled"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let results = classify_batch(Arc::new(c), &lines).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].decision, Decision::Block);
        assert!(!results[0].is_fallback());
        assert!(results[1].is_fallback());
        assert!(results[2].is_fallback());
        assert_eq!(results[2].original_text, "garbled");
    }
}
