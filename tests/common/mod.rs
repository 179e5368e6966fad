//! Shared fixtures for triage integration tests
//!
//! Small fitted models over an Italian helpdesk vocabulary. Parameters are
//! hand-picked so that predictions are easy to reason about.

#![allow(dead_code)]

use ndarray::{array, Array2};
use std::sync::Arc;
use ticket_triage::config::TriageConfig;
use ticket_triage::ml::{
    ClassWeights, FeatureClassifier, LinearModel, MultinomialNb, TextPipeline, TfidfVectorizer,
};
use ticket_triage::Result;

pub const VOCABULARY: [&str; 10] = [
    "accesso",
    "password",
    "login",
    "non riesco",
    "fattura",
    "rimborso",
    "pagamento",
    "server",
    "errore",
    "lento",
];

pub fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Unigram + bigram TF-IDF over `VOCABULARY`
pub fn vectorizer() -> TfidfVectorizer {
    TfidfVectorizer::new(
        labels(&VOCABULARY),
        array![1.2, 1.5, 1.3, 1.8, 1.4, 1.6, 1.3, 1.5, 1.1, 1.7],
        (1, 2),
    )
    .unwrap()
}

/// Naive Bayes over access / billing / technical
pub fn category_model() -> MultinomialNb {
    let prior = (1.0f64 / 3.0).ln();
    MultinomialNb::new(
        labels(&["access", "billing", "technical"]),
        array![prior, prior, prior],
        array![
            [-1.0, -1.1, -1.2, -1.5, -4.0, -4.0, -4.0, -3.5, -3.0, -4.0],
            [-4.0, -4.0, -4.0, -3.5, -1.0, -1.2, -1.1, -4.0, -3.5, -4.0],
            [-3.0, -4.0, -3.0, -3.0, -4.0, -4.0, -4.0, -1.0, -1.2, -1.3]
        ],
    )
    .unwrap()
}

/// Logistic regression over low / medium / high
pub fn priority_model() -> LinearModel {
    LinearModel::new(
        labels(&["low", "medium", "high"]),
        array![
            [0.5, 0.8, 0.2, 0.0, 0.6, 0.4, 0.3, -1.0, -0.8, -0.5],
            [0.2, 0.0, 0.3, 0.5, 0.3, 0.6, 0.5, 0.4, 0.5, 1.2],
            [-0.3, -0.6, 0.6, 1.0, -0.5, -0.4, -0.3, 1.5, 1.4, 0.2]
        ],
        array![0.1, 0.0, -0.1],
    )
    .unwrap()
}

pub fn category_pipeline() -> TextPipeline {
    TextPipeline::new(vectorizer(), category_model().into())
}

pub fn priority_pipeline() -> TextPipeline {
    TextPipeline::new(vectorizer(), priority_model().into())
}

pub fn shared_pipelines() -> (Arc<TextPipeline>, Arc<TextPipeline>) {
    (Arc::new(category_pipeline()), Arc::new(priority_pipeline()))
}

/// Write both pipelines as JSON artifacts and point a default config at them
pub fn config_with_artifacts(dir: &std::path::Path) -> TriageConfig {
    let category_path = dir.join("category_model.json");
    let priority_path = dir.join("priority_model.json");

    std::fs::write(&category_path, serde_json::to_string(&category_pipeline()).unwrap()).unwrap();
    std::fs::write(&priority_path, serde_json::to_string(&priority_pipeline()).unwrap()).unwrap();

    let mut config = TriageConfig::default();
    config.models.category_model = category_path;
    config.models.priority_model = priority_path;
    config
}

/// Classifier without per-feature weights; always predicts the same label
pub struct OpaqueModel {
    classes: Vec<String>,
    label: String,
}

impl OpaqueModel {
    /// Predicts its first class
    pub fn new(classes: &[&str]) -> Self {
        Self {
            classes: labels(classes),
            label: classes[0].to_string(),
        }
    }

    /// Predicts `label`, which need not be one of `classes`
    pub fn predicting(classes: &[&str], label: &str) -> Self {
        Self {
            classes: labels(classes),
            label: label.to_string(),
        }
    }
}

impl FeatureClassifier for OpaqueModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>> {
        Ok(vec![self.label.clone(); features.nrows()])
    }
}

/// Linear model whose predictions carry a label outside its class list
pub struct RelabeledModel {
    inner: LinearModel,
    label: String,
}

impl RelabeledModel {
    pub fn new(inner: LinearModel, label: &str) -> Self {
        Self {
            inner,
            label: label.to_string(),
        }
    }
}

impl FeatureClassifier for RelabeledModel {
    fn classes(&self) -> &[String] {
        self.inner.classes()
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>> {
        Ok(vec![self.label.clone(); features.nrows()])
    }

    fn class_weights(&self) -> ClassWeights<'_> {
        self.inner.class_weights()
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {} to be close to {}",
        actual,
        expected
    );
}
