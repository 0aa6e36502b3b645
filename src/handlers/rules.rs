//! Rules handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{AppState, AppResult};
use crate::error::reject_body;
use crate::models::{CreateRule, Rule, INVALID_RULE_MESSAGE};

/// List rules in matching order
pub async fn list(State(state): State<AppState>) -> Json<Vec<Rule>> {
    Json(state.rules.list())
}

/// Create new rule
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateRule>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Rule>)> {
    let Json(req) = body.map_err(|e| reject_body(e, INVALID_RULE_MESSAGE))?;

    let rule = state.rules.add(req)?;

    tracing::info!(
        "Rule created: {} {:?} -> {:?} ({} rules)",
        rule.id, rule.category, rule.action, state.rules.len()
    );

    Ok((StatusCode::CREATED, Json(rule)))
}

/// Delete rule
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let rule = state.rules.delete(&id)?;

    tracing::info!("Rule deleted: {} ({})", rule.id, rule.category);

    Ok(StatusCode::NO_CONTENT)
}
