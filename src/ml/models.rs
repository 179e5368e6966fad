use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-class probabilities for a single text
pub type ClassProbabilities = HashMap<String, f64>;

/// Confidence of a prediction: the largest class probability.
///
/// `None` for an empty distribution.
pub fn max_probability(probabilities: &ClassProbabilities) -> Option<f64> {
    probabilities.values().copied().reduce(f64::max)
}

/// Prediction result with optional confidence score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction<T> {
    /// Predicted value
    pub value: T,

    /// Confidence score (0.0 - 1.0), if the model reports probabilities
    pub confidence: Option<f64>,

    /// All class probabilities
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub probabilities: ClassProbabilities,
}

impl<T> Prediction<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            confidence: None,
            probabilities: HashMap::new(),
        }
    }

    /// Attach class probabilities; confidence becomes their maximum
    pub fn with_probabilities(mut self, probabilities: ClassProbabilities) -> Self {
        self.confidence = max_probability(&probabilities);
        self.probabilities = probabilities;
        self
    }

    /// Check if confidence is known and below `threshold`
    pub fn is_below(&self, threshold: f64) -> bool {
        self.confidence.is_some_and(|c| c < threshold)
    }
}
