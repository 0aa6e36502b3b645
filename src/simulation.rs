//! Rule simulation
//!
//! Derives the actions the current rule list would take on a batch of
//! classifier results. Nothing is enforced; the report is recomputed on
//! every analysis request.
//!
//! Matching priority: the classifier's category order comes first, rule
//! order second. For each result the first category that has any rule
//! wins, and among rules for that category the earliest-added one wins.

use crate::models::{AnalysisResult, Rule, SimulatedAction};

/// Simulate `rules` against every result, in input order
pub fn simulate(results: &[AnalysisResult], rules: &[Rule]) -> Vec<SimulatedAction> {
    results
        .iter()
        .filter_map(|result| {
            let rule = first_match(result, rules)?;
            Some(SimulatedAction {
                original_text: result.original_text.clone(),
                action: rule.action,
                reason: result.reason.clone(),
                matched_rule: rule.clone(),
                analysis: result.clone(),
            })
        })
        .collect()
}

/// First rule matched by `result`, scanning categories before rules
pub fn first_match<'a>(result: &AnalysisResult, rules: &'a [Rule]) -> Option<&'a Rule> {
    result
        .categories
        .iter()
        .find_map(|category| rules.iter().find(|rule| &rule.category == category))
}
