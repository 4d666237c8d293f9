//! Prompt composition — the fixed four-section generation template.
//!
//! Sections, in order: identity block, delimited recent-conversation window,
//! delimited long-term memory window, closing instruction naming the persona
//! and echoing the literal user input. The prompt ends with the persona cue
//! and nothing after it — generation appends directly.
//!
//! Composition is deterministic: identical inputs produce byte-identical
//! output. A missing field is an error, never an empty section — "no data"
//! cases arrive as explicit sentinel strings from the memory renders.

use echomind_core::error::ComposeError;

/// Renders the per-turn generation prompt.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    persona_name: String,
}

impl PromptComposer {
    pub fn new(persona_name: impl Into<String>) -> Self {
        Self {
            persona_name: persona_name.into(),
        }
    }

    /// Compose the full prompt, or fail without producing a partial one.
    pub fn compose(
        &self,
        identity_context: &str,
        stm_rendered: &str,
        ltm_rendered: &str,
        user_input: &str,
    ) -> Result<String, ComposeError> {
        for (name, value) in [
            ("identity_context", identity_context),
            ("short_term_memory", stm_rendered),
            ("long_term_memory", ltm_rendered),
            ("user_input", user_input),
        ] {
            if value.trim().is_empty() {
                return Err(ComposeError::MissingField(name));
            }
        }

        let name = &self.persona_name;
        Ok(format!(
            "{identity_context}\n\
             \n\
             --- Conversation Context ---\n\
             [recent conversation]\n\
             {stm_rendered}\n\
             [end recent conversation]\n\
             \n\
             [related long-term memory]\n\
             {ltm_rendered}\n\
             [end related long-term memory]\n\
             --- End Conversation Context ---\n\
             \n\
             Respond as {name} to the user's message below, following every \
             directive and constraint above.\n\
             User: {user_input}\n\
             {name}:"
        ))
    }
}
