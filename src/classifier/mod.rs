//! External classifier adapter
//!
//! The classifier is an opaque collaborator: one line in, one verdict out.
//! Batches fan out one task per line and fan back in, in input order. A
//! line whose call or parse fails gets a fallback result, so a batch only
//! fails when `ready()` says nothing can be sent at all.

pub mod gemini;
pub mod parse;

use std::sync::Arc;

use serde::Deserialize;

use crate::models::{AnalysisResult, Decision};

pub use gemini::GeminiClassifier;
pub use parse::parse_verdict;

// ============================================================================
// TYPES
// ============================================================================

/// Parsed classifier answer for one line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub decision: Decision,
    pub reason: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub problematic_phrase: Option<String>,
}

impl Verdict {
    pub fn into_result(self, original_text: String) -> AnalysisResult {
        AnalysisResult {
            original_text,
            decision: self.decision,
            reason: self.reason,
            categories: self.categories,
            problematic_phrase: self.problematic_phrase,
            fallback: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier API key is not configured")]
    MissingCredential,

    #[error("{0}")]
    Transport(String),

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("classifier returned no text")]
    EmptyResponse,

    #[error("unparseable classifier output: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        ClassifierError::Transport(err.to_string())
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

#[axum::async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Whether a batch can be sent at all (credential, endpoint)
    fn ready(&self) -> Result<(), ClassifierError>;

    /// Classify a single line
    async fn classify(&self, line: &str) -> Result<Verdict, ClassifierError>;
}

// ============================================================================
// BATCH FAN-OUT
// ============================================================================

/// Classify every line concurrently, preserving input order
pub async fn classify_batch(
    classifier: Arc<dyn Classifier>,
    lines: &[String],
) -> Result<Vec<AnalysisResult>, ClassifierError> {
    classifier.ready()?;

    let handles: Vec<_> = lines
        .iter()
        .cloned()
        .map(|line| {
            let classifier = Arc::clone(&classifier);
            tokio::spawn(async move {
                let outcome = classifier.classify(&line).await;
                match outcome {
                    Ok(verdict) => verdict.into_result(line),
                    Err(e) => {
                        tracing::error!("Error classifying line {:?}: {}", line, e);
                        AnalysisResult::fallback(line)
                    }
                }
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (handle, line) in handles.into_iter().zip(lines) {
        let result = handle.await.unwrap_or_else(|e| {
            tracing::error!("Classifier task for line {:?} did not complete: {}", line, e);
            AnalysisResult::fallback(line.clone())
        });
        results.push(result);
    }

    Ok(results)
}
