//! Hybrid priority decision engine
//!
//! A deterministic keyword layer sets the priority whenever a high- or
//! medium-severity pattern matches; otherwise the priority classifier decides,
//! and an uncertain "high" is downgraded to "medium".

pub mod config;
pub mod engine;
pub mod rules;

pub use config::{
    PriorityConfig, DEFAULT_HIGH_PATTERNS, DEFAULT_LOW_CONFIDENCE_THRESHOLD, DEFAULT_MEDIUM_PATTERNS,
};
pub use engine::{decide_priority, PriorityEngine};
pub use rules::PriorityRules;
