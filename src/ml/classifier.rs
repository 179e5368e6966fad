use crate::error::{Result, TriageError};
use crate::ml::features::{TfidfVectorizer, Vectorizer};
use crate::ml::models::ClassProbabilities;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Text-in, label-out classifier
pub trait TextClassifier: Send + Sync {
    /// Predict one label per text
    fn predict(&self, texts: &[&str]) -> Result<Vec<String>>;

    /// Predict class probabilities per text.
    ///
    /// `Ok(None)` means the model has no probability capability.
    fn predict_proba(&self, _texts: &[&str]) -> Result<Option<Vec<ClassProbabilities>>> {
        Ok(None)
    }
}

/// Per-feature class weights a classifier exposes for explanations
#[derive(Debug, Clone)]
pub enum ClassWeights<'a> {
    /// Linear coefficients, one row per class
    Linear(ArrayView2<'a, f64>),
    /// Log feature probabilities, one row per class
    LogProbability(ArrayView2<'a, f64>),
    /// No per-feature weights available
    Unsupported,
}

/// Classifier operating on vectorized features
pub trait FeatureClassifier: Send + Sync {
    /// Known class labels, in weight-row order
    fn classes(&self) -> &[String];

    /// Predict one label per feature row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>>;

    /// Class probabilities per row, columns in `classes()` order
    fn predict_proba(&self, _features: &Array2<f64>) -> Result<Option<Array2<f64>>> {
        Ok(None)
    }

    /// Weights used to explain predictions
    fn class_weights(&self) -> ClassWeights<'_> {
        ClassWeights::Unsupported
    }
}

/// Multinomial logistic regression with fitted coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LinearParams")]
pub struct LinearModel {
    classes: Vec<String>,

    /// n_classes × n_features
    coef: Array2<f64>,

    /// n_classes
    intercept: Array1<f64>,
}

#[derive(Deserialize)]
struct LinearParams {
    classes: Vec<String>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl LinearModel {
    /// Create a model from fitted parameters; `coef` has one row per class
    pub fn new(classes: Vec<String>, coef: Array2<f64>, intercept: Array1<f64>) -> Result<Self> {
        validate_classes(&classes)?;

        if coef.nrows() != classes.len() || intercept.len() != classes.len() {
            return Err(TriageError::Model(format!(
                "linear model with {} classes needs {} coefficient rows and intercepts, got {} and {}",
                classes.len(),
                classes.len(),
                coef.nrows(),
                intercept.len()
            )));
        }

        Ok(Self {
            classes,
            coef,
            intercept,
        })
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    fn decision_function(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_width(features, self.n_features())?;
        Ok(features.dot(&self.coef.t()) + &self.intercept)
    }
}

impl TryFrom<LinearParams> for LinearModel {
    type Error = TriageError;

    fn try_from(params: LinearParams) -> Result<Self> {
        LinearModel::new(params.classes, params.coef, params.intercept)
    }
}

impl FeatureClassifier for LinearModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>> {
        let scores = self.decision_function(features)?;
        Ok(label_rows(&scores, &self.classes))
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Option<Array2<f64>>> {
        let scores = self.decision_function(features)?;
        Ok(Some(softmax_rows(scores)))
    }

    fn class_weights(&self) -> ClassWeights<'_> {
        ClassWeights::Linear(self.coef.view())
    }
}

/// Multinomial naive Bayes with fitted log probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NaiveBayesParams")]
pub struct MultinomialNb {
    classes: Vec<String>,

    /// n_classes
    class_log_prior: Array1<f64>,

    /// n_classes × n_features
    feature_log_prob: Array2<f64>,
}

#[derive(Deserialize)]
struct NaiveBayesParams {
    classes: Vec<String>,
    class_log_prior: Array1<f64>,
    feature_log_prob: Array2<f64>,
}

impl MultinomialNb {
    /// Create a model from fitted parameters; `feature_log_prob` has one row per class
    pub fn new(
        classes: Vec<String>,
        class_log_prior: Array1<f64>,
        feature_log_prob: Array2<f64>,
    ) -> Result<Self> {
        validate_classes(&classes)?;

        if feature_log_prob.nrows() != classes.len() || class_log_prior.len() != classes.len() {
            return Err(TriageError::Model(format!(
                "naive Bayes model with {} classes needs {} priors and log-probability rows, got {} and {}",
                classes.len(),
                classes.len(),
                class_log_prior.len(),
                feature_log_prob.nrows()
            )));
        }

        Ok(Self {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Get number of features
    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    fn joint_log_likelihood(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        check_width(features, self.n_features())?;
        Ok(features.dot(&self.feature_log_prob.t()) + &self.class_log_prior)
    }
}

impl TryFrom<NaiveBayesParams> for MultinomialNb {
    type Error = TriageError;

    fn try_from(params: NaiveBayesParams) -> Result<Self> {
        MultinomialNb::new(params.classes, params.class_log_prior, params.feature_log_prob)
    }
}

impl FeatureClassifier for MultinomialNb {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>> {
        let jll = self.joint_log_likelihood(features)?;
        Ok(label_rows(&jll, &self.classes))
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Option<Array2<f64>>> {
        // exp(jll - logsumexp(jll)) is the softmax of the joint log-likelihood
        let jll = self.joint_log_likelihood(features)?;
        Ok(Some(softmax_rows(jll)))
    }

    fn class_weights(&self) -> ClassWeights<'_> {
        ClassWeights::LogProbability(self.feature_log_prob.view())
    }
}

/// Classifier families a pipeline can carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FeatureModel {
    Linear(LinearModel),
    NaiveBayes(MultinomialNb),
}

impl FeatureModel {
    fn inner(&self) -> &dyn FeatureClassifier {
        match self {
            FeatureModel::Linear(model) => model,
            FeatureModel::NaiveBayes(model) => model,
        }
    }
}

impl FeatureClassifier for FeatureModel {
    fn classes(&self) -> &[String] {
        self.inner().classes()
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<String>> {
        self.inner().predict(features)
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Option<Array2<f64>>> {
        self.inner().predict_proba(features)
    }

    fn class_weights(&self) -> ClassWeights<'_> {
        self.inner().class_weights()
    }
}

impl From<LinearModel> for FeatureModel {
    fn from(model: LinearModel) -> Self {
        FeatureModel::Linear(model)
    }
}

impl From<MultinomialNb> for FeatureModel {
    fn from(model: MultinomialNb) -> Self {
        FeatureModel::NaiveBayes(model)
    }
}

/// Vectorizer followed by a feature classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPipeline<V = TfidfVectorizer, C = FeatureModel> {
    vectorizer: V,
    classifier: C,
}

impl<V: Vectorizer, C: FeatureClassifier> TextPipeline<V, C> {
    pub fn new(vectorizer: V, classifier: C) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    pub fn vectorizer(&self) -> &V {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

impl<V, C> TextPipeline<V, C>
where
    V: Vectorizer + DeserializeOwned,
    C: FeatureClassifier + DeserializeOwned,
{
    /// Load a fitted pipeline from a JSON artifact
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let pipeline: Self = serde_json::from_str(&raw)?;
        Ok(pipeline)
    }
}

impl<V: Vectorizer, C: FeatureClassifier> TextClassifier for TextPipeline<V, C> {
    fn predict(&self, texts: &[&str]) -> Result<Vec<String>> {
        let features = self.vectorizer.transform(texts)?;
        self.classifier.predict(&features)
    }

    fn predict_proba(&self, texts: &[&str]) -> Result<Option<Vec<ClassProbabilities>>> {
        let features = self.vectorizer.transform(texts)?;
        let Some(proba) = self.classifier.predict_proba(&features)? else {
            return Ok(None);
        };

        let classes = self.classifier.classes();
        let rows = proba
            .axis_iter(Axis(0))
            .map(|row| {
                classes
                    .iter()
                    .cloned()
                    .zip(row.iter().copied())
                    .collect::<ClassProbabilities>()
            })
            .collect();

        Ok(Some(rows))
    }
}

fn validate_classes(classes: &[String]) -> Result<()> {
    if classes.is_empty() {
        return Err(TriageError::Model("model has no classes".to_string()));
    }

    let mut seen = HashSet::with_capacity(classes.len());
    for class in classes {
        if !seen.insert(class.as_str()) {
            return Err(TriageError::Model(format!("duplicate class label '{}'", class)));
        }
    }

    Ok(())
}

fn check_width(features: &Array2<f64>, expected: usize) -> Result<()> {
    if features.ncols() != expected {
        return Err(TriageError::Model(format!(
            "model expects {} features, input has {}",
            expected,
            features.ncols()
        )));
    }
    Ok(())
}

/// Label of the highest-scoring column per row; first column wins ties
fn label_rows(scores: &Array2<f64>, classes: &[String]) -> Vec<String> {
    scores
        .axis_iter(Axis(0))
        .map(|row| {
            let mut best = 0;
            for (idx, &score) in row.iter().enumerate() {
                if score > row[best] {
                    best = idx;
                }
            }
            classes[best].clone()
        })
        .collect()
}

fn softmax_rows(mut scores: Array2<f64>) -> Array2<f64> {
    for mut row in scores.axis_iter_mut(Axis(0)) {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|s| (s - max).exp());
        let total = row.sum();
        if total > 0.0 {
            row.mapv_inplace(|p| p / total);
        }
    }
    scores
}
