//! Configuration for the fallback completion engine

/// Configuration for fallback responses
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Model identifier (informational; the engine itself is injected)
    pub model_id: String,

    /// Maximum tokens to generate per response
    pub max_tokens: usize,

    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: f32,

    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_id: "llama-2-7b-chat.Q4_K_M".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl LlmConfig {
    /// Create a new configuration with the specified model
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Default::default()
        }
    }

    /// Set the maximum tokens per response
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set top-p sampling
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}
