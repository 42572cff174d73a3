//! Fallback responder wrapping a black-box completion engine
//!
//! Anything the keyword interpreter cannot classify lands here. The
//! responder never fails outward: a missing engine, an engine error, or
//! malformed output all degrade to a human-readable string so conversational
//! continuity can never crash the session.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::config::LlmConfig;
use crate::services::{CompletionEngine, CompletionRequest};

/// Turn-role labels for the prompt template. Also used as stop markers so
/// the model cannot fabricate a next user turn.
const USER_LABEL: &str = "User:";
const ASSISTANT_LABEL: &str = "Assistant:";

/// Fixed response when no completion engine is loaded
pub const BASIC_MODE_RESPONSE: &str = "I'm running in basic mode without language model \
     capabilities. Load a completion model to enable smart responses.";

pub struct FallbackResponder {
    config: LlmConfig,
    engine: Option<Arc<dyn CompletionEngine>>,
}

impl FallbackResponder {
    /// Create a responder with an optional engine.
    ///
    /// The engine reference is read-only for the process lifetime.
    pub fn new(config: LlmConfig, engine: Option<Arc<dyn CompletionEngine>>) -> Self {
        Self { config, engine }
    }

    /// Create a responder with no engine (basic mode)
    pub fn basic() -> Self {
        Self::new(LlmConfig::default(), None)
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Generate a conversational response for the prompt. Never panics or
    /// returns an error; the result is always speakable text.
    pub fn respond(&self, prompt: &str) -> String {
        let Some(engine) = &self.engine else {
            debug!("No completion engine loaded, returning basic mode response");
            return BASIC_MODE_RESPONSE.to_string();
        };

        let formatted = format!("{} {}\n{}", USER_LABEL, prompt, ASSISTANT_LABEL);
        let stop = [USER_LABEL, ASSISTANT_LABEL];
        let request = CompletionRequest {
            prompt: &formatted,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stop: &stop,
        };

        match engine.complete(&request) {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    warn!("Completion engine returned empty output");
                    "I don't have a good answer for that.".to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                warn!("Completion engine failed: {}", e);
                format!(
                    "I encountered an error while processing your request: {}",
                    e
                )
            }
        }
    }
}
