use crate::error::Result;
use crate::priority::PriorityConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Main triage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TriageConfig {
    /// Priority decision engine
    #[serde(default)]
    #[validate(nested)]
    pub priority: PriorityConfig,

    /// Explanations
    #[serde(default)]
    #[validate(nested)]
    pub explain: ExplainConfig,

    /// Category prediction
    #[serde(default)]
    #[validate(nested)]
    pub category: CategoryConfig,

    /// Model artifact locations
    #[serde(default)]
    pub models: ModelPaths,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl TriageConfig {
    /// Load configuration from `config_path` (optional) and environment
    pub fn load_from(config_path: &str) -> Result<Self> {
        let config: TriageConfig = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(config_path).required(false))
            // Override with environment variables (prefix: TRIAGE__)
            .add_source(
                config::Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExplainConfig {
    /// Number of influential terms to report
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1, max = 100))]
    pub top_k: usize,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryConfig {
    /// Category confidence below this marks a ticket for human review
    #[serde(default = "default_review_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub review_threshold: f64,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            review_threshold: default_review_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPaths {
    /// Category pipeline artifact (JSON)
    #[serde(default = "default_category_model")]
    pub category_model: PathBuf,

    /// Priority pipeline artifact (JSON)
    #[serde(default = "default_priority_model")]
    pub priority_model: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            category_model: default_category_model(),
            priority_model: default_priority_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// Default value functions
fn default_top_k() -> usize {
    5
}

fn default_review_threshold() -> f64 {
    0.55
}

fn default_category_model() -> PathBuf {
    PathBuf::from("models/category_model.json")
}

fn default_priority_model() -> PathBuf {
    PathBuf::from("models/priority_model.json")
}

fn default_log_level() -> String {
    "info".to_string()
}
