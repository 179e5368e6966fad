use crate::error::{Result, TriageError};
use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").expect("valid url pattern"));
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zàèéìòù0-9\s]").expect("valid character class"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Turns raw text into a numeric feature matrix over a fixed vocabulary
pub trait Vectorizer: Send + Sync {
    /// Transform texts into a matrix with one row per text and one column per feature
    fn transform(&self, texts: &[&str]) -> Result<Array2<f64>>;

    /// Ordered vocabulary; column `j` of `transform` output is `feature_names()[j]`
    fn feature_names(&self) -> &[String];

    /// Number of features
    fn n_features(&self) -> usize {
        self.feature_names().len()
    }
}

/// Text preprocessing utilities
pub struct TextPreprocessor;

impl TextPreprocessor {
    /// Lowercase, drop URLs and punctuation, collapse whitespace.
    ///
    /// Keeps ASCII letters, digits and the accented vowels used in Italian.
    pub fn basic_clean(text: &str) -> String {
        let text = text.to_lowercase();
        let text = URL_RE.replace_all(&text, " ");
        let text = NON_WORD_RE.replace_all(&text, " ");
        let text = WHITESPACE_RE.replace_all(&text, " ");
        text.trim().to_string()
    }

    /// Split cleaned text into word tokens of at least two characters
    pub fn tokenize(text: &str) -> Vec<&str> {
        TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Build word n-grams for every `n` in `range` (inclusive), joined by a single space
    pub fn ngrams(tokens: &[&str], range: (usize, usize)) -> Vec<String> {
        let mut terms = Vec::new();

        for n in range.0..=range.1 {
            if n == 0 {
                continue;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }

        terms
    }
}

/// Fitted parameters of a TF-IDF vectorizer
#[derive(Debug, Clone, Deserialize)]
struct TfidfParams {
    vocabulary: Vec<String>,
    idf: Array1<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    normalize: bool,
}

/// TF-IDF vectorizer built from an already fitted vocabulary and IDF vector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TfidfParams")]
pub struct TfidfVectorizer {
    /// Ordered vocabulary
    vocabulary: Vec<String>,

    /// Inverse document frequency per vocabulary term
    idf: Array1<f64>,

    /// N-gram range (min, max)
    ngram_range: (usize, usize),

    /// L2-normalize each row
    normalize: bool,

    /// Term -> column lookup
    #[serde(skip_serializing)]
    index: HashMap<String, usize>,
}

impl TfidfVectorizer {
    /// Create a vectorizer from fitted parameters
    pub fn new(vocabulary: Vec<String>, idf: Array1<f64>, ngram_range: (usize, usize)) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(TriageError::Model(format!(
                "vocabulary has {} terms but idf has {} values",
                vocabulary.len(),
                idf.len()
            )));
        }

        if ngram_range.0 == 0 || ngram_range.0 > ngram_range.1 {
            return Err(TriageError::Model(format!(
                "invalid n-gram range ({}, {})",
                ngram_range.0, ngram_range.1
            )));
        }

        let mut index = HashMap::with_capacity(vocabulary.len());
        for (idx, term) in vocabulary.iter().enumerate() {
            if index.insert(term.clone(), idx).is_some() {
                return Err(TriageError::Model(format!("duplicate vocabulary term '{}'", term)));
            }
        }

        Ok(Self {
            vocabulary,
            idf,
            ngram_range,
            normalize: true,
            index,
        })
    }

    /// Disable or enable L2 row normalization
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Get the n-gram range
    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Look up the column of a term
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Extract vocabulary-independent terms from raw text
    pub fn extract_terms(&self, text: &str) -> Vec<String> {
        let cleaned = TextPreprocessor::basic_clean(text);
        let tokens = TextPreprocessor::tokenize(&cleaned);
        TextPreprocessor::ngrams(&tokens, self.ngram_range)
    }

    fn transform_one(&self, text: &str, row: &mut ndarray::ArrayViewMut1<f64>) {
        for term in self.extract_terms(text) {
            if let Some(&idx) = self.index.get(&term) {
                row[idx] += 1.0;
            }
        }

        row.zip_mut_with(&self.idf, |value, &idf| *value *= idf);

        if self.normalize {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|value| value / norm);
            }
        }
    }
}

impl TryFrom<TfidfParams> for TfidfVectorizer {
    type Error = TriageError;

    fn try_from(params: TfidfParams) -> Result<Self> {
        Ok(TfidfVectorizer::new(params.vocabulary, params.idf, params.ngram_range)?
            .with_normalize(params.normalize))
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, texts: &[&str]) -> Result<Array2<f64>> {
        let mut features = Array2::zeros((texts.len(), self.vocabulary.len()));

        for (text, mut row) in texts.iter().zip(features.rows_mut()) {
            self.transform_one(text, &mut row);
        }

        Ok(features)
    }

    fn feature_names(&self) -> &[String] {
        &self.vocabulary
    }
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_true() -> bool {
    true
}
