pub mod assistant;
pub mod config;
pub mod handlers;
pub mod intent;
pub mod llm;
pub mod services;
pub mod transcript;
pub mod voice;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParleyError {
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Transient I/O failure: {0}")]
    TransientIo(String),

    #[error("No match found: {0}")]
    NoMatchFound(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("Launch error: {0}")]
    LaunchError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ParleyError {
    fn from(e: std::io::Error) -> Self {
        ParleyError::TransientIo(e.to_string())
    }
}

impl ParleyError {
    /// Check if this error is recoverable within the running session
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Optional collaborators stay absent until restart
            ParleyError::ServiceUnavailable(_) => false,
            // These are typically transient
            ParleyError::TransientIo(_) => true,
            ParleyError::NoMatchFound(_) => true,
            ParleyError::InferenceError(_) => true,
            ParleyError::CaptureError(_) => true,
            ParleyError::LaunchError(_) => true,
            // Channel breakage means the worker loop is gone
            ParleyError::ChannelError(_) => false,
            ParleyError::ConfigError(_) => false,
            ParleyError::Internal(_) => true,
        }
    }

    /// Get a user-friendly description suitable for the transcript
    pub fn user_message(&self) -> String {
        match self {
            ParleyError::ServiceUnavailable(_) => {
                "That feature is not available right now.".to_string()
            }
            ParleyError::TransientIo(_) => {
                "A network or device error occurred. Please try again.".to_string()
            }
            ParleyError::NoMatchFound(_) => {
                "I couldn't find anything for that.".to_string()
            }
            ParleyError::InferenceError(_) => {
                "Response generation failed. Please try again.".to_string()
            }
            ParleyError::CaptureError(_) => {
                "Voice capture failed. Please try again.".to_string()
            }
            ParleyError::LaunchError(_) => {
                "I couldn't launch that application.".to_string()
            }
            ParleyError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            ParleyError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            ParleyError::Internal(_) => {
                "Something went wrong handling that request. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;
