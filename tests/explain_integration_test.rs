/// Integration tests for top-term explanations
///
/// Covers both weight families, the "not available" sentinel and the
/// unknown-class fallback.

mod common;

use common::{
    category_pipeline, labels, priority_model, priority_pipeline, vectorizer, OpaqueModel,
    RelabeledModel,
};
use ticket_triage::explain::top_terms;
use ticket_triage::ml::{FeatureClassifier, FeatureModel, TextClassifier, TextPipeline, TfidfVectorizer, Vectorizer};
use ticket_triage::models::{Explanation, EXPLANATION_UNAVAILABLE};

const TEXTS: [&str; 5] = [
    "Non riesco a fare login, password errata",
    "Rimborso della fattura dopo il pagamento",
    "Il server è lento e va in errore",
    "Accesso negato",
    "Nessuna parola nota qui",
];

fn assert_well_formed<V: Vectorizer, C: FeatureClassifier>(
    pipeline: &TextPipeline<V, C>,
    text: &str,
    explanation: &Explanation,
    k: usize,
) {
    assert!(explanation.terms.len() <= k);

    let features = pipeline.vectorizer().transform(&[text]).unwrap();
    let names = pipeline.vectorizer().feature_names();
    for term in &explanation.terms {
        let idx = names.iter().position(|n| *n == term.term).unwrap();
        assert!(features[[0, idx]] != 0.0, "'{}' is not in '{}'", term.term, text);
    }

    for pair in explanation.terms.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_linear_explanations_are_well_formed() {
    let pipeline = priority_pipeline();

    for text in TEXTS {
        for k in [0, 1, 3, 10] {
            let explanation = top_terms(&pipeline, text, k).unwrap();
            assert_well_formed(&pipeline, text, &explanation, k);
            assert!(!explanation.class_fallback);
        }
    }
}

#[test]
fn test_naive_bayes_explanations_are_well_formed() {
    let pipeline = category_pipeline();

    for text in TEXTS {
        let explanation = top_terms(&pipeline, text, 5).unwrap();
        assert_well_formed(&pipeline, text, &explanation, 5);

        // Log probabilities are negative, so are all scores
        assert!(explanation.terms.iter().all(|t| t.score <= 0.0));
    }
}

#[test]
fn test_prediction_matches_pipeline() {
    let pipeline = category_pipeline();

    for text in TEXTS {
        let explanation = top_terms(&pipeline, text, 5).unwrap();
        assert_eq!(vec![explanation.predicted], pipeline.predict(&[text]).unwrap());
    }
}

#[test]
fn test_specific_ranking() {
    let pipeline = category_pipeline();
    let explanation = top_terms(&pipeline, "Rimborso della fattura dopo il pagamento", 2).unwrap();

    assert_eq!(explanation.predicted, "billing");
    let terms: Vec<&str> = explanation.terms.iter().map(|t| t.term.as_str()).collect();
    // Highest (least negative) value × log-probability first
    assert_eq!(terms, vec!["fattura", "pagamento"]);
}

#[test]
fn test_bigrams_are_explained() {
    let pipeline = priority_pipeline();
    let explanation = top_terms(&pipeline, "Login, non riesco", 5).unwrap();

    assert_eq!(explanation.predicted, "high");
    assert_eq!(explanation.terms[0].term, "non riesco");
    assert_eq!(explanation.terms[1].term, "login");
}

#[test]
fn test_empty_text_has_no_terms() {
    for text in ["", "   ", "!!! ???"] {
        let explanation = top_terms(&category_pipeline(), text, 5).unwrap();
        assert!(explanation.terms.is_empty());
        assert!(!explanation.is_unavailable());
    }
}

#[test]
fn test_model_without_weights_gives_sentinel() {
    let pipeline = TextPipeline::new(vectorizer(), OpaqueModel::new(&["billing", "access"]));
    let explanation = top_terms(&pipeline, "Rimborso fattura", 5).unwrap();

    assert_eq!(explanation.predicted, "billing");
    assert_eq!(explanation.terms.len(), 1);
    assert_eq!(explanation.terms[0].term, EXPLANATION_UNAVAILABLE);
    assert_eq!(explanation.terms[0].score, 0.0);
    assert!(!explanation.class_fallback);
}

#[test]
fn test_sentinel_keeps_unknown_label_flag() {
    let pipeline = TextPipeline::new(vectorizer(), OpaqueModel::predicting(&["billing", "access"], "spam"));
    let explanation = top_terms(&pipeline, "Rimborso fattura", 5).unwrap();

    assert_eq!(explanation.predicted, "spam");
    assert!(explanation.is_unavailable());
    assert!(explanation.class_fallback);
}

#[test]
fn test_unknown_label_falls_back_to_first_class() {
    let pipeline = TextPipeline::new(vectorizer(), RelabeledModel::new(priority_model(), "urgentissimo"));
    let explanation = top_terms(&pipeline, "password e login", 5).unwrap();

    assert_eq!(explanation.predicted, "urgentissimo");
    assert!(explanation.class_fallback);

    // Scored against the "low" row
    let terms: Vec<&str> = explanation.terms.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(terms, vec!["password", "login"]);
}

#[test]
fn test_vocabulary_mismatch_is_model_fault() {
    let narrow = TfidfVectorizer::new(
        labels(&["password", "login"]),
        ndarray::array![1.0, 1.0],
        (1, 1),
    )
    .unwrap();
    let pipeline = TextPipeline::new(narrow, FeatureModel::from(priority_model()));

    let err = top_terms(&pipeline, "password", 5).unwrap_err();
    assert!(err.is_model_fault());
}
