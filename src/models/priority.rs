use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Ticket priority, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    #[serde(alias = "bassa")]
    #[strum(to_string = "low", serialize = "bassa")]
    Low,

    #[serde(alias = "media")]
    #[strum(to_string = "medium", serialize = "media")]
    Medium,

    #[serde(alias = "alta")]
    #[strum(to_string = "high", serialize = "alta")]
    High,
}

impl Priority {
    /// All levels, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Check if the priority calls for escalation
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::High)
    }
}

/// Which layer produced a priority decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecisionReason {
    /// A high-severity keyword matched
    RuleHigh,
    /// A medium-severity keyword matched
    RuleMedium,
    /// Classifier prediction taken as-is
    Ml,
    /// Classifier was unsure; the conservative adjustment applied
    MlLowConfidence,
}

impl DecisionReason {
    /// Check if the decision came from the rule layer
    pub fn is_rule(&self) -> bool {
        matches!(self, DecisionReason::RuleHigh | DecisionReason::RuleMedium)
    }
}

/// Outcome of the hybrid priority decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityDecision {
    /// Final priority
    pub priority: Priority,

    /// Classifier confidence; only set when the classifier decided
    pub confidence: Option<f64>,

    /// Decision reason tag
    pub reason: DecisionReason,
}

impl PriorityDecision {
    /// Decision taken by the rule layer
    pub fn from_rule(priority: Priority) -> Self {
        let reason = if priority.is_high() {
            DecisionReason::RuleHigh
        } else {
            DecisionReason::RuleMedium
        };

        Self {
            priority,
            confidence: None,
            reason,
        }
    }

    /// Decision taken by the classifier
    pub fn from_model(priority: Priority, confidence: Option<f64>, reason: DecisionReason) -> Self {
        Self {
            priority,
            confidence,
            reason,
        }
    }
}
