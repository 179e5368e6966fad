use crate::error::{Result, TriageError};
use crate::ml::classifier::{ClassWeights, FeatureClassifier, TextPipeline};
use crate::ml::features::Vectorizer;
use crate::models::{Explanation, TermScore};
use ndarray::ArrayView1;

/// Top-`k` terms of `text` that pushed the pipeline towards its prediction.
///
/// Each feature present in the text is scored as its value times the predicted
/// class's weight (linear coefficient or log feature probability). Terms absent
/// from the text are never returned. Models without per-feature weights yield
/// the "not available" sentinel.
pub fn top_terms<V, C>(pipeline: &TextPipeline<V, C>, text: &str, k: usize) -> Result<Explanation>
where
    V: Vectorizer,
    C: FeatureClassifier,
{
    let vectorizer = pipeline.vectorizer();
    let classifier = pipeline.classifier();

    let features = vectorizer.transform(&[text])?;
    let predicted = classifier
        .predict(&features)?
        .into_iter()
        .next()
        .ok_or_else(|| TriageError::Model("classifier returned no prediction".to_string()))?;

    let (class_index, class_fallback) = match classifier.classes().iter().position(|c| *c == predicted) {
        Some(idx) => (idx, false),
        None => (0, true),
    };

    let weights = match classifier.class_weights() {
        ClassWeights::Linear(coef) => coef,
        ClassWeights::LogProbability(log_prob) => log_prob,
        ClassWeights::Unsupported => {
            return Ok(Explanation {
                class_fallback,
                ..Explanation::unavailable(predicted)
            });
        }
    };

    if class_index >= weights.nrows() {
        return Err(TriageError::Model(format!(
            "no weights for class index {} ({} rows)",
            class_index,
            weights.nrows()
        )));
    }

    let terms = rank_present_terms(
        features.row(0),
        weights.row(class_index),
        vectorizer.feature_names(),
        k,
    )?;

    Ok(Explanation {
        predicted,
        terms,
        class_fallback,
    })
}

/// Score features with a nonzero value and keep the `k` best, highest first
fn rank_present_terms(
    vector: ArrayView1<'_, f64>,
    weights: ArrayView1<'_, f64>,
    feature_names: &[String],
    k: usize,
) -> Result<Vec<TermScore>> {
    if vector.len() != weights.len() || vector.len() != feature_names.len() {
        return Err(TriageError::Model(format!(
            "feature vector has {} values, class weights {} and vocabulary {} terms",
            vector.len(),
            weights.len(),
            feature_names.len()
        )));
    }

    let mut candidates: Vec<(usize, f64)> = vector
        .iter()
        .zip(weights.iter())
        .enumerate()
        .filter(|&(_, (&value, _))| value != 0.0)
        .map(|(idx, (&value, &weight))| (idx, value * weight))
        .collect();

    // Stable: equal scores keep vocabulary order
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(candidates
        .into_iter()
        .take(k)
        .map(|(idx, score)| TermScore::new(feature_names[idx].clone(), score))
        .collect())
}
