use serde::{Deserialize, Serialize};

/// A support ticket as submitted by a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Short subject line
    #[serde(default)]
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub body: String,
}

impl Ticket {
    /// Create a new ticket
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Model input: title and body joined by a single space
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.body).trim().to_string()
    }

    /// Check if the ticket carries no text at all
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty()
    }
}
