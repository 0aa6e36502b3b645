//! Classifier output parsing

use super::{ClassifierError, Verdict};

/// Parse raw model text into a verdict.
///
/// Accepts a bare JSON object, one wrapped in a Markdown code fence, or an
/// object embedded in surrounding prose.
pub fn parse_verdict(raw: &str) -> Result<Verdict, ClassifierError> {
    let trimmed = strip_code_fence(raw.trim());

    if let Ok(verdict) = serde_json::from_str::<Verdict>(trimmed) {
        return Ok(verdict);
    }

    let object = extract_json_object(trimmed)
        .ok_or_else(|| ClassifierError::Parse("no JSON object in response".to_string()))?;

    serde_json::from_str::<Verdict>(object).map_err(|e| ClassifierError::Parse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}
