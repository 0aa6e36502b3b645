//! Analysis handler

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{AppError, AppResult, AppState};
use crate::classifier::classify_batch;
use crate::error::reject_body;
use crate::models::{AnalyzeRequest, AnalyzeResponse, INVALID_LINES_MESSAGE};
use crate::simulation::simulate;

/// Classify a batch of lines and simulate the current rules against it
pub async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let Json(req) = body.map_err(|e| reject_body(e, INVALID_LINES_MESSAGE))?;

    let lines = match req.lines {
        Some(lines) if !lines.is_empty() => lines,
        _ => return Err(AppError::ValidationError(INVALID_LINES_MESSAGE.to_string())),
    };

    tracing::info!("Analyzing {} lines with {}", lines.len(), state.classifier.name());

    let analysis = classify_batch(Arc::clone(&state.classifier), &lines).await?;

    let rules = state.rules.list();
    let simulation = simulate(&analysis, &rules);

    let fallbacks = analysis.iter().filter(|r| r.is_fallback()).count();
    tracing::info!(
        "Analysis complete: {} results ({} fallbacks), {} simulated actions against {} rules",
        analysis.len(), fallbacks, simulation.len(), rules.len()
    );

    Ok(Json(AnalyzeResponse { analysis, simulation }))
}
