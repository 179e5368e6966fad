use crate::config::TriageConfig;
use crate::error::{Result, TriageError};
use crate::explain::top_terms;
use crate::ml::classifier::{FeatureClassifier, FeatureModel, TextClassifier, TextPipeline};
use crate::ml::features::{TfidfVectorizer, Vectorizer};
use crate::ml::models::Prediction;
use crate::models::{DecisionReason, Explanation, Priority, PriorityDecision, Ticket};
use crate::priority::PriorityEngine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

/// Category, priority and explanations for one ticket
pub struct TriageService<V = TfidfVectorizer, C = FeatureModel> {
    /// Category pipeline
    category_model: Arc<TextPipeline<V, C>>,

    /// Priority pipeline (classifier fallback of the decision engine)
    priority_model: Arc<TextPipeline<V, C>>,

    /// Priority decision engine
    engine: PriorityEngine,

    /// Number of terms per explanation
    top_k: usize,

    /// Category confidence below this marks the ticket for review
    review_threshold: f64,
}

impl<V, C> TriageService<V, C>
where
    V: Vectorizer,
    C: FeatureClassifier,
{
    /// Create a new triage service
    pub fn new(
        category_model: Arc<TextPipeline<V, C>>,
        priority_model: Arc<TextPipeline<V, C>>,
        config: &TriageConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            category_model,
            priority_model,
            engine: PriorityEngine::new(&config.priority)?,
            top_k: config.explain.top_k,
            review_threshold: config.category.review_threshold,
        })
    }

    /// Priority decision engine in use
    pub fn engine(&self) -> &PriorityEngine {
        &self.engine
    }

    /// Triage a single ticket
    pub fn triage(&self, ticket: &Ticket) -> Result<TriageOutcome> {
        let text = ticket.text();

        let category = self.predict_category(&text)?;
        let needs_review = category.is_below(self.review_threshold);

        let priority = self.engine.decide(self.priority_model.as_ref(), &text)?;

        let category_explanation = self.explain(&self.category_model, &text, "category")?;
        let priority_explanation = self.explain(&self.priority_model, &text, "priority")?;

        debug!(
            category = %category.value,
            category_confidence = ?category.confidence,
            priority = %priority.priority,
            reason = %priority.reason,
            needs_review,
            "Ticket triaged"
        );

        Ok(TriageOutcome {
            category: category.value,
            category_confidence: category.confidence,
            needs_review,
            priority,
            category_explanation,
            priority_explanation,
        })
    }

    /// Triage tickets independently and in parallel; results keep input order
    pub fn triage_batch(&self, tickets: &[Ticket]) -> Vec<Result<TriageOutcome>> {
        info!("Triaging batch of {} tickets", tickets.len());
        tickets.par_iter().map(|ticket| self.triage(ticket)).collect()
    }

    fn predict_category(&self, text: &str) -> Result<Prediction<String>> {
        let label = self
            .category_model
            .predict(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| TriageError::Model("category model returned no prediction".to_string()))?;

        let prediction = match self
            .category_model
            .predict_proba(&[text])?
            .and_then(|rows| rows.into_iter().next())
        {
            Some(probabilities) => Prediction::new(label).with_probabilities(probabilities),
            None => Prediction::new(label),
        };

        Ok(prediction)
    }

    fn explain(&self, model: &TextPipeline<V, C>, text: &str, target: &str) -> Result<Explanation> {
        let explanation = top_terms(model, text, self.top_k)?;

        if explanation.class_fallback {
            warn!(
                target_model = target,
                predicted = %explanation.predicted,
                "Predicted label is not a known class; explained with the first class instead"
            );
        }

        Ok(explanation)
    }
}

impl TriageService {
    /// Build a service from the model artifacts named in `config`
    pub fn from_config(config: &TriageConfig) -> Result<Self> {
        info!(
            "Loading models from {} and {}",
            config.models.category_model.display(),
            config.models.priority_model.display()
        );

        let category_model = TextPipeline::from_json_file(&config.models.category_model)?;
        let priority_model = TextPipeline::from_json_file(&config.models.priority_model)?;

        Self::new(Arc::new(category_model), Arc::new(priority_model), config)
    }
}

/// Triage result for one ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageOutcome {
    /// Predicted category
    pub category: String,

    /// Category confidence, if the model reports probabilities
    pub category_confidence: Option<f64>,

    /// Low category confidence: ticket may be ambiguous
    pub needs_review: bool,

    /// Hybrid priority decision
    pub priority: PriorityDecision,

    /// Terms behind the category prediction
    pub category_explanation: Explanation,

    /// Terms behind the priority classifier's prediction
    pub priority_explanation: Explanation,
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub failed: usize,
    pub needs_review: usize,
    pub by_priority: HashMap<Priority, usize>,
    pub by_reason: HashMap<DecisionReason, usize>,
    pub by_category: HashMap<String, usize>,
}

impl BatchStats {
    /// Summarize batch results
    pub fn from_results(results: &[Result<TriageOutcome>]) -> Self {
        let mut stats = BatchStats {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match result {
                Ok(outcome) => {
                    *stats.by_priority.entry(outcome.priority.priority).or_insert(0) += 1;
                    *stats.by_reason.entry(outcome.priority.reason).or_insert(0) += 1;
                    *stats.by_category.entry(outcome.category.clone()).or_insert(0) += 1;
                    if outcome.needs_review {
                        stats.needs_review += 1;
                    }
                }
                Err(_) => stats.failed += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::{LinearModel, MultinomialNb};
    use ndarray::{array, Array1, Array2};

    fn vectorizer() -> TfidfVectorizer {
        let vocabulary: Vec<String> = ["accesso", "fattura", "password", "rimborso", "server"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        TfidfVectorizer::new(vocabulary, Array1::ones(5), (1, 1)).unwrap()
    }

    fn service() -> TriageService {
        let category = MultinomialNb::new(
            vec!["access".to_string(), "billing".to_string()],
            array![(0.5f64).ln(), (0.5f64).ln()],
            array![
                [-0.7, -3.0, -0.9, -3.0, -2.0],
                [-3.0, -0.6, -3.0, -0.8, -3.0]
            ],
        )
        .unwrap();
        let priority = LinearModel::new(
            vec!["low".to_string(), "medium".to_string(), "high".to_string()],
            array![
                [1.0, 1.0, 1.0, 1.0, -2.0],
                [0.0, 0.5, 0.0, 0.5, 0.0],
                [-1.0, -1.0, -1.0, -1.0, 4.0]
            ],
            array![0.0, 0.0, 0.0],
        )
        .unwrap();

        TriageService::new(
            Arc::new(TextPipeline::new(vectorizer(), category.into())),
            Arc::new(TextPipeline::new(vectorizer(), priority.into())),
            &TriageConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_triage_rule_ticket() {
        let outcome = service()
            .triage(&Ticket::new("Errore 500 su login", "È bloccante"))
            .unwrap();

        assert_eq!(outcome.priority.priority, Priority::High);
        assert_eq!(outcome.priority.reason, DecisionReason::RuleHigh);
        assert_eq!(outcome.priority.confidence, None);
    }

    #[test]
    fn test_triage_model_ticket() {
        let outcome = service()
            .triage(&Ticket::new("Fattura", "Richiesta rimborso fattura"))
            .unwrap();

        assert_eq!(outcome.category, "billing");
        assert!(outcome.category_confidence.unwrap() > 0.55);
        assert!(!outcome.needs_review);
        assert_eq!(outcome.priority.reason, DecisionReason::Ml);
        assert_eq!(outcome.category_explanation.predicted, "billing");
        assert!(outcome.category_explanation.terms.len() <= 5);
        assert!(outcome
            .category_explanation
            .terms
            .iter()
            .all(|t| t.term == "fattura" || t.term == "rimborso"));
    }

    #[test]
    fn test_triage_empty_ticket() {
        let outcome = service().triage(&Ticket::default()).unwrap();

        assert!(outcome.category_explanation.terms.is_empty());
        assert!(outcome.priority_explanation.terms.is_empty());
        // Zero vector: both classes tie at the prior
        assert_eq!(outcome.category_confidence, Some(0.5));
        assert!(outcome.needs_review);
    }

    #[test]
    fn test_batch_keeps_order() {
        let tickets = vec![
            Ticket::new("Password", "Non ricordo la password di accesso"),
            Ticket::new("Fattura", "Rimborso fattura"),
            Ticket::new("Pagamento", "Il pagamento è in ritardo"),
        ];

        let results = service().triage_batch(&tickets);
        assert_eq!(results.len(), 3);

        let outcomes: Vec<&TriageOutcome> = results.iter().map(|r| r.as_ref().unwrap()).collect();
        assert_eq!(outcomes[0].category, "access");
        assert_eq!(outcomes[1].category, "billing");
        assert_eq!(outcomes[2].priority.reason, DecisionReason::RuleMedium);

        let stats = BatchStats::from_results(&results);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.by_reason.get(&DecisionReason::RuleMedium), Some(&1));
        assert_eq!(stats.by_category.get("billing"), Some(&1));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = TriageConfig::default();
        config.category.review_threshold = 2.0;

        let model = || {
            let linear = LinearModel::new(vec!["low".to_string()], Array2::zeros((1, 5)), array![0.0]).unwrap();
            Arc::new(TextPipeline::new(vectorizer(), FeatureModel::from(linear)))
        };

        let result = TriageService::new(model(), model(), &config);
        assert!(matches!(result, Err(TriageError::Validation(_))));
    }

    #[test]
    fn test_long_title_is_triaged() {
        let service = service();
        let ticket = Ticket::new("fattura ".repeat(70), "rimborso");
        let outcome = service.triage(&ticket).unwrap();

        let direct = service
            .engine()
            .decide(service.priority_model.as_ref(), &ticket.text())
            .unwrap();

        assert_eq!(outcome.category, "billing");
        assert_eq!(outcome.priority, direct);
    }
}
