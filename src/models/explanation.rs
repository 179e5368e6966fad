use serde::{Deserialize, Serialize};

/// Term shown when a model offers no per-feature weights
pub const EXPLANATION_UNAVAILABLE: &str = "(explanation not available for this model)";

/// One influential term and its score for the predicted class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

impl TermScore {
    pub fn new(term: impl Into<String>, score: f64) -> Self {
        Self {
            term: term.into(),
            score,
        }
    }
}

/// Top influential terms behind a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Predicted class label
    pub predicted: String,

    /// Terms present in the input, highest score first
    pub terms: Vec<TermScore>,

    /// Set when the predicted label was not among the classifier's classes
    /// and the first class was used instead. Points at a model/vocabulary
    /// mismatch.
    #[serde(default)]
    pub class_fallback: bool,
}

impl Explanation {
    /// Explanation for a model without usable weights
    pub fn unavailable(predicted: impl Into<String>) -> Self {
        Self {
            predicted: predicted.into(),
            terms: vec![TermScore::new(EXPLANATION_UNAVAILABLE, 0.0)],
            class_fallback: false,
        }
    }

    /// Check if this is the "not available" sentinel
    pub fn is_unavailable(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].term == EXPLANATION_UNAVAILABLE
    }
}
