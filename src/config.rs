//! Assistant configuration

use std::time::Duration;

use crate::llm::LlmConfig;

/// Configuration for the assistant core
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// Fallback responder configuration
    pub llm: LlmConfig,

    /// Bounded duration for one voice-capture attempt
    pub capture_timeout: Duration,

    /// Delay between the farewell response and the termination effect,
    /// long enough for speech synthesis to begin
    pub exit_grace: Duration,

    /// Capacity of the command and event channels
    pub channel_capacity: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            capture_timeout: Duration::from_secs(5),
            exit_grace: Duration::from_secs(2),
            channel_capacity: 100,
        }
    }
}

impl AssistantConfig {
    /// Set the fallback responder configuration
    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    /// Set the voice capture timeout
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Set the exit grace delay
    pub fn with_exit_grace(mut self, grace: Duration) -> Self {
        self.exit_grace = grace;
        self
    }

    /// Set the channel capacity
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}
