//! Moderation rule model and in-memory rule store

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppError;

pub const INVALID_RULE_MESSAGE: &str =
    "Invalid rule data. \"category\" and \"action\" (\"FLAG\" or \"BLOCK\") are required.";

/// Action a rule applies to matching content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleAction {
    Flag,
    Block,
}

impl RuleAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FLAG" => Some(RuleAction::Flag),
            "BLOCK" => Some(RuleAction::Block),
            _ => None,
        }
    }
}

/// Category -> action mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub category: String,
    pub action: RuleAction,
}

/// Create rule request.
///
/// Fields stay loosely typed so a bad value is reported with the rule
/// validation message instead of a deserializer error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateRule {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl CreateRule {
    pub fn new(category: &str, action: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            action: Some(action.to_string()),
        }
    }

    /// Validate and normalize into `(category, action)`
    pub fn validate(&self) -> Result<(String, RuleAction), AppError> {
        let category = self.category
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());

        let action = self.action.as_deref().and_then(RuleAction::parse);

        match (category, action) {
            (Some(category), Some(action)) => Ok((category, action)),
            _ => Err(AppError::ValidationError(INVALID_RULE_MESSAGE.to_string())),
        }
    }
}

/// Ordered, process-lifetime rule list shared by all handlers.
///
/// Insertion order is matching priority: earlier rules win.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Arc<RwLock<Vec<Rule>>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rules in insertion order
    pub fn list(&self) -> Vec<Rule> {
        self.rules.read().clone()
    }

    /// Validate, normalize and append a new rule
    pub fn add(&self, data: CreateRule) -> Result<Rule, AppError> {
        let (category, action) = data.validate()?;

        let rule = Rule {
            id: Uuid::new_v4().to_string(),
            category,
            action,
        };

        self.rules.write().push(rule.clone());
        Ok(rule)
    }

    /// Remove the rule with `id`
    pub fn delete(&self, id: &str) -> Result<Rule, AppError> {
        let mut rules = self.rules.write();
        let index = rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Rule not found.".to_string()))?;

        Ok(rules.remove(index))
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}
