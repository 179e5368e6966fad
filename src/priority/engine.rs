use crate::error::{Result, TriageError};
use crate::ml::classifier::TextClassifier;
use crate::ml::models::max_probability;
use crate::models::{DecisionReason, Priority, PriorityDecision};
use crate::priority::config::PriorityConfig;
use crate::priority::rules::PriorityRules;
use once_cell::sync::Lazy;
use validator::Validate;

static DEFAULT_ENGINE: Lazy<PriorityEngine> = Lazy::new(|| {
    PriorityEngine::new(&PriorityConfig::default()).expect("built-in priority rules must compile")
});

/// Hybrid priority decision: keyword rules first, classifier second,
/// with a conservative downgrade of uncertain "high" predictions.
#[derive(Debug, Clone)]
pub struct PriorityEngine {
    rules: PriorityRules,
    low_confidence_threshold: f64,
}

impl PriorityEngine {
    /// Build an engine from configuration
    pub fn new(config: &PriorityConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            rules: PriorityRules::new(&config.high_patterns, &config.medium_patterns)?,
            low_confidence_threshold: config.low_confidence_threshold,
        })
    }

    /// Shared engine with the built-in threshold and patterns
    pub fn default_engine() -> &'static PriorityEngine {
        &DEFAULT_ENGINE
    }

    pub fn rules(&self) -> &PriorityRules {
        &self.rules
    }

    pub fn low_confidence_threshold(&self) -> f64 {
        self.low_confidence_threshold
    }

    /// Decide the priority of `text`.
    ///
    /// The classifier is only consulted when no rule matches. A classifier
    /// without probabilities yields a decision with no confidence; any other
    /// classifier error is returned unchanged.
    pub fn decide<C>(&self, classifier: &C, text: &str) -> Result<PriorityDecision>
    where
        C: TextClassifier + ?Sized,
    {
        let text = text.trim();

        if let Some(priority) = self.rules.rule_priority(text) {
            return Ok(PriorityDecision::from_rule(priority));
        }

        let label = classifier
            .predict(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| TriageError::Model("classifier returned no prediction".to_string()))?;

        let predicted: Priority = label.parse().map_err(|_| {
            TriageError::Model(format!("classifier label '{}' is not a priority level", label))
        })?;

        let confidence = classifier
            .predict_proba(&[text])?
            .and_then(|rows| rows.into_iter().next())
            .and_then(|probabilities| max_probability(&probabilities));

        match confidence {
            Some(c) if c < self.low_confidence_threshold => {
                // Never escalate to high on an uncertain prediction
                let priority = if predicted == Priority::High {
                    Priority::Medium
                } else {
                    predicted
                };
                Ok(PriorityDecision::from_model(
                    priority,
                    confidence,
                    DecisionReason::MlLowConfidence,
                ))
            }
            _ => Ok(PriorityDecision::from_model(
                predicted,
                confidence,
                DecisionReason::Ml,
            )),
        }
    }
}

/// Decide with the built-in rules and threshold
pub fn decide_priority<C>(classifier: &C, text: &str) -> Result<PriorityDecision>
where
    C: TextClassifier + ?Sized,
{
    DEFAULT_ENGINE.decide(classifier, text)
}
