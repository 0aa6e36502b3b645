//! Analysis and simulation models

use serde::{Deserialize, Serialize};

use super::rule::{Rule, RuleAction};

pub const INVALID_LINES_MESSAGE: &str =
    "Request body must be an array of strings called \"lines\".";

pub const FALLBACK_REASON: &str = "Failed to parse AI response.";
pub const FALLBACK_CATEGORY: &str = "ERROR";

/// Classifier verdict for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Allow,
    Flag,
    Block,
}

/// Classifier output for one input line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub original_text: String,
    pub decision: Decision,
    pub reason: String,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problematic_phrase: Option<String>,
    /// Set only by `fallback()`; never on the wire
    #[serde(skip)]
    pub fallback: bool,
}

impl AnalysisResult {
    /// Substitute result for a line the classifier failed to answer usefully
    pub fn fallback(original_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            decision: Decision::Flag,
            reason: FALLBACK_REASON.to_string(),
            categories: vec![FALLBACK_CATEGORY.to_string()],
            problematic_phrase: Some(String::new()),
            fallback: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Action the rule list would have taken on a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedAction {
    pub original_text: String,
    pub action: RuleAction,
    pub reason: String,
    pub matched_rule: Rule,
    pub analysis: AnalysisResult,
}

/// Analyze request.
///
/// `lines` is optional so a missing field is reported with the lines
/// validation message rather than a deserializer error.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub lines: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: Vec<AnalysisResult>,
    pub simulation: Vec<SimulatedAction>,
}
