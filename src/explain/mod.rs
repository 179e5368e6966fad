//! Explainability for text classifiers
//!
//! Ranks the terms of an input text by how much they pushed a fitted
//! vectorizer + classifier pipeline towards its predicted class.

pub mod extractor;

pub use extractor::top_terms;
