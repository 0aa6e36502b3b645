//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    classifier: String,
    classifier_configured: bool,
    rule_count: usize,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        classifier: state.classifier.name().to_string(),
        classifier_configured: state.classifier.ready().is_ok(),
        rule_count: state.rules.len(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
