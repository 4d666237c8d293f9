//! Interaction record — one completed user/assistant exchange.
//!
//! The same rendered form is stored in both memory tiers: appended to the
//! short-term buffer and written to the long-term store. There is no
//! separate schema per tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single logical turn: what the user said and what the assistant answered.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// The user's input, trimmed.
    pub user_text: String,

    /// The assistant's complete response.
    pub assistant_text: String,

    /// When the exchange completed.
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    /// Create a new interaction record.
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            created_at: Utc::now(),
        }
    }

    /// The storage form persisted into both memory tiers.
    pub fn render(&self) -> String {
        format!("User: {}\nAssistant: {}", self.user_text, self.assistant_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_matches_storage_contract() {
        let interaction = Interaction::new("Hello", "Hi there");
        assert_eq!(interaction.render(), "User: Hello\nAssistant: Hi there");
    }

    #[test]
    fn render_preserves_multiline_responses() {
        let interaction = Interaction::new("explain", "line one\nline two");
        let rendered = interaction.render();
        assert!(rendered.starts_with("User: explain\nAssistant: line one"));
        assert!(rendered.ends_with("line two"));
    }

    #[test]
    fn serialization_roundtrip() {
        let interaction = Interaction::new("q", "a");
        let json = serde_json::to_string(&interaction).unwrap();
        let parsed: Interaction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, interaction);
    }
}
