use crate::error::Result;
use crate::models::Priority;
use crate::priority::config::{DEFAULT_HIGH_PATTERNS, DEFAULT_MEDIUM_PATTERNS};
use regex::RegexSet;

/// Keyword rule layer: two ordered tiers of word-boundary patterns.
///
/// Patterns are matched against the trimmed, lower-cased text. The high tier is
/// always checked before the medium tier.
#[derive(Debug, Clone)]
pub struct PriorityRules {
    high: RegexSet,
    medium: RegexSet,
}

impl PriorityRules {
    /// Compile both tiers
    pub fn new<S: AsRef<str>>(high_patterns: &[S], medium_patterns: &[S]) -> Result<Self> {
        Ok(Self {
            high: RegexSet::new(high_patterns)?,
            medium: RegexSet::new(medium_patterns)?,
        })
    }

    /// Compile the built-in pattern lists
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_HIGH_PATTERNS, DEFAULT_MEDIUM_PATTERNS)
    }

    /// Priority imposed by the rules, if any pattern matches
    pub fn rule_priority(&self, text: &str) -> Option<Priority> {
        let text = normalize(text);

        if self.high.is_match(&text) {
            Some(Priority::High)
        } else if self.medium.is_match(&text) {
            Some(Priority::Medium)
        } else {
            None
        }
    }

    /// Every pattern that matches `text`, high tier first
    pub fn matched_patterns(&self, text: &str) -> Vec<&str> {
        let text = normalize(text);
        let mut matched = Vec::new();

        for set in [&self.high, &self.medium] {
            let patterns = set.patterns();
            matched.extend(set.matches(&text).into_iter().map(|idx| patterns[idx].as_str()));
        }

        matched
    }

    /// Number of high and medium patterns
    pub fn len(&self) -> (usize, usize) {
        (self.high.len(), self.medium.len())
    }

    /// Check if both tiers are empty
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.medium.is_empty()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
