use serde::{Deserialize, Serialize};
use validator::Validate;

/// Below this classifier confidence the conservative adjustment applies
pub const DEFAULT_LOW_CONFIDENCE_THRESHOLD: f64 = 0.55;

/// Blocking, critical or urgent conditions, server errors, unavailable services
pub const DEFAULT_HIGH_PATTERNS: &[&str] = &[
    r"\bbloccante\b",
    r"\burgente\b",
    r"\bcritico\b",
    r"\bcrash\b",
    r"\berrore 500\b",
    r"\bnon disponibile\b",
    r"\bapi non risponde\b",
];

/// Degraded but not blocking: timeouts, slowness, delays, missing or wrong data
pub const DEFAULT_MEDIUM_PATTERNS: &[&str] = &[
    r"\btimeout\b",
    r"\blent[oaie]\b",
    r"\bin ritardo\b",
    r"\bmancante\b",
    r"\bnon corretta\b",
];

/// Priority decision engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PriorityConfig {
    /// Confidence threshold (0.0 - 1.0) for the conservative adjustment
    #[serde(default = "default_low_confidence_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub low_confidence_threshold: f64,

    /// High-severity rule patterns, matched against lower-cased text
    #[serde(default = "default_high_patterns")]
    pub high_patterns: Vec<String>,

    /// Medium-severity rule patterns, matched against lower-cased text
    #[serde(default = "default_medium_patterns")]
    pub medium_patterns: Vec<String>,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: default_low_confidence_threshold(),
            high_patterns: default_high_patterns(),
            medium_patterns: default_medium_patterns(),
        }
    }
}

fn default_low_confidence_threshold() -> f64 {
    DEFAULT_LOW_CONFIDENCE_THRESHOLD
}

fn default_high_patterns() -> Vec<String> {
    DEFAULT_HIGH_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_medium_patterns() -> Vec<String> {
    DEFAULT_MEDIUM_PATTERNS.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_config_default() {
        let config = PriorityConfig::default();
        assert_eq!(config.low_confidence_threshold, 0.55);
        assert_eq!(config.high_patterns.len(), 7);
        assert_eq!(config.medium_patterns.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_priority_config_rejects_out_of_range_threshold() {
        let config = PriorityConfig {
            low_confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_priority_config_partial_override() {
        let config: PriorityConfig = serde_json::from_str(r#"{"low_confidence_threshold": 0.7}"#).unwrap();
        assert_eq!(config.low_confidence_threshold, 0.7);
        assert_eq!(config.high_patterns, default_high_patterns());
    }
}
