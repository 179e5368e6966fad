//! Text classification for ticket triage
//!
//! Models are built from already fitted parameters (TF-IDF vocabulary and IDF,
//! linear coefficients or naive Bayes log probabilities) and loaded from JSON
//! artifacts. The service composes category prediction, the priority decision
//! engine and explanations.

pub mod classifier;
pub mod features;
pub mod models;
pub mod service;

pub use classifier::{
    ClassWeights, FeatureClassifier, FeatureModel, LinearModel, MultinomialNb, TextClassifier,
    TextPipeline,
};
pub use features::{TextPreprocessor, TfidfVectorizer, Vectorizer};
pub use models::{max_probability, ClassProbabilities, Prediction};
pub use service::{BatchStats, TriageOutcome, TriageService};
