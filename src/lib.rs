//! Support-ticket triage
//!
//! Predicts a ticket's category, decides its priority with a hybrid of keyword
//! rules and a classifier, and explains each prediction through the input
//! terms that influenced it most.

pub mod batch;
pub mod config;
pub mod error;
pub mod explain;
pub mod ml;
pub mod models;
pub mod priority;

pub use error::{Result, TriageError};
