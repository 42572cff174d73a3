//! Fallback conversation path backed by a local text-completion engine

pub mod config;
pub mod responder;

pub use config::LlmConfig;
pub use responder::FallbackResponder;
