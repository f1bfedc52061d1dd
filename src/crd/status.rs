//! # BBBFrontend Status
//!
//! Status types for tracking reconciliation outcome.

use serde::{Deserialize, Serialize};

/// Status of the BBBFrontend resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BBBFrontendStatus {
    /// Conditions represent the latest available observations.
    /// The operator owns the `Ready` condition; other types are preserved untouched.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Generation of the resource the condition was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Last time the status flipped (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    /// Machine-readable reason
    #[serde(default)]
    pub reason: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

impl BBBFrontendStatus {
    /// Look up a condition by type
    #[must_use]
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.r#type == condition_type)
    }

    /// Replace the condition of the same type, or append it when absent.
    ///
    /// Conditions are keyed by type: any duplicate entries of that type are collapsed
    /// into the single replacement, which keeps the position of the first one.
    pub fn set_condition(&mut self, condition: Condition) {
        let position = self
            .conditions
            .iter()
            .position(|c| c.r#type == condition.r#type);
        self.conditions.retain(|c| c.r#type != condition.r#type);
        match position {
            Some(index) => self.conditions.insert(index, condition),
            None => self.conditions.push(condition),
        }
    }
}
