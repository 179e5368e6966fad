use thiserror::Error;

/// Triage error types
#[derive(Error, Debug)]
pub enum TriageError {
    /// Validation errors (caller input, configuration values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model errors: a model rejected its input or produced unusable output
    #[error("Model error: {0}")]
    Model(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TriageError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            TriageError::Validation(_) => "VALIDATION_ERROR",
            TriageError::Configuration(_) => "CONFIGURATION_ERROR",
            TriageError::Model(_) => "MODEL_ERROR",
            TriageError::Io(_) => "IO_ERROR",
            TriageError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the error came from a supplied model rather than from the caller
    pub fn is_model_fault(&self) -> bool {
        matches!(self, TriageError::Model(_))
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for TriageError {
    fn from(err: serde_json::Error) -> Self {
        TriageError::Serialization(err.to_string())
    }
}

/// Conversion from csv::Error
impl From<csv::Error> for TriageError {
    fn from(err: csv::Error) -> Self {
        TriageError::Serialization(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for TriageError {
    fn from(err: validator::ValidationErrors) -> Self {
        TriageError::Validation(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for TriageError {
    fn from(err: config::ConfigError) -> Self {
        TriageError::Configuration(err.to_string())
    }
}

/// Conversion from regex::Error (rule pattern compilation)
impl From<regex::Error> for TriageError {
    fn from(err: regex::Error) -> Self {
        TriageError::Configuration(format!("invalid rule pattern: {}", err))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TriageError>;
