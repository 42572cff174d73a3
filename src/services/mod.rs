//! Collaborator interfaces for the assistant core
//!
//! Everything long-running or platform-specific lives behind one of these
//! traits: process/browser launch, encyclopedia lookup, language-model
//! completion, and voice capture. The core only depends on the narrow
//! request/response contracts defined here; real engines and mocks plug in
//! from outside.

use std::process::Command;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::{ParleyError, Result};

/// Launches applications and URLs by opaque name; success/failure only.
pub trait AppLauncher: Send + Sync {
    /// Launch an application by logical name (e.g. "chrome", "code")
    fn open_app(&self, name: &str) -> Result<()>;

    /// Open a URL in the default browser
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Typed failures from the encyclopedia lookup service
#[derive(Error, Debug, Clone)]
pub enum LookupError {
    #[error("no article found for '{0}'")]
    NotFound(String),

    #[error("ambiguous subject '{0}'")]
    Ambiguous(String),

    #[error("lookup I/O failure: {0}")]
    Io(String),
}

/// Bounded-length encyclopedia summaries.
///
/// Implementations enforce their own timeout; the core never blocks longer
/// than the service itself does.
pub trait Encyclopedia: Send + Sync {
    /// Return a short summary (at most two sentences) for the subject
    fn summarize(&self, subject: &str) -> std::result::Result<String, LookupError>;
}

/// One completion request handed to the engine.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    /// Upper bound on generated tokens
    pub max_tokens: usize,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,
    /// Generation stops before any of these markers
    pub stop: &'a [&'a str],
}

/// Black-box text-completion engine.
///
/// The instance is shared read-only for the process lifetime. Implementations
/// must either tolerate concurrent `complete` calls or serialize internally;
/// the core issues at most one inference at a time by convention but does not
/// enforce it.
pub trait CompletionEngine: Send + Sync {
    /// Generate a bounded completion for the request, honoring its stop
    /// markers and sampling parameters.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;
}

/// Typed failures from voice capture
#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    #[error("voice capture is not available")]
    Unavailable,

    #[error("no speech detected")]
    NoSpeech,

    #[error("capture timed out")]
    Timeout,

    #[error("capture I/O failure: {0}")]
    Io(String),
}

/// Phase edges reported by a capture implementation.
///
/// Lets the coordinator drive the Listening -> Processing transition without
/// owning any audio I/O itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// Microphone channel acquired, recording
    Listening,
    /// Recording finished, transcription running
    Processing,
}

/// Blocking speech capture + transcription, called only from a capture worker.
///
/// Implementations must release the audio channel on every exit path and
/// should poll `cancel` to abandon work early when the user toggles capture
/// off; a late result after cancellation is discarded by the coordinator
/// either way.
pub trait VoiceCapture: Send + Sync {
    fn capture(
        &self,
        timeout: Duration,
        cancel: &AtomicBool,
        on_phase: &mut dyn FnMut(CapturePhase),
    ) -> std::result::Result<String, CaptureError>;
}

/// Launcher backed by platform process spawning.
pub struct SystemLauncher;

impl SystemLauncher {
    fn spawn(&self, program: &str, args: &[&str]) -> Result<()> {
        debug!("Launching: {} {:?}", program, args);
        Command::new(program)
            .args(args)
            .spawn()
            .map(|_| ())
            .map_err(|e| ParleyError::LaunchError(format!("{}: {}", program, e)))
    }
}

impl AppLauncher for SystemLauncher {
    fn open_app(&self, name: &str) -> Result<()> {
        match name {
            "chrome" => {
                #[cfg(target_os = "windows")]
                return self.spawn("cmd", &["/C", "start", "chrome"]);
                #[cfg(target_os = "macos")]
                return self.spawn("open", &["-a", "Google Chrome"]);
                #[cfg(not(any(target_os = "windows", target_os = "macos")))]
                return self.spawn("google-chrome", &[]);
            }
            "code" => self.spawn("code", &[]),
            other => Err(ParleyError::LaunchError(format!(
                "unknown application '{}'",
                other
            ))),
        }
    }

    fn open_url(&self, url: &str) -> Result<()> {
        #[cfg(target_os = "windows")]
        return self.spawn("cmd", &["/C", "start", url]);
        #[cfg(target_os = "macos")]
        return self.spawn("open", &[url]);
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return self.spawn("xdg-open", &[url]);
    }
}

/// Encyclopedia stand-in used when no lookup service is configured.
///
/// Every query reports `NotFound`, which the wiki handler degrades to its
/// graceful web-search offer.
pub struct UnavailableEncyclopedia;

impl Encyclopedia for UnavailableEncyclopedia {
    fn summarize(&self, subject: &str) -> std::result::Result<String, LookupError> {
        Err(LookupError::NotFound(subject.to_string()))
    }
}

/// Capture stand-in used when no speech recognizer is installed.
pub struct UnavailableVoiceCapture;

impl VoiceCapture for UnavailableVoiceCapture {
    fn capture(
        &self,
        _timeout: Duration,
        _cancel: &AtomicBool,
        _on_phase: &mut dyn FnMut(CapturePhase),
    ) -> std::result::Result<String, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_encyclopedia_reports_not_found() {
        let wiki = UnavailableEncyclopedia;
        match wiki.summarize("gravity") {
            Err(LookupError::NotFound(subject)) => assert_eq!(subject, "gravity"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_capture_reports_unavailable() {
        let capture = UnavailableVoiceCapture;
        let cancel = AtomicBool::new(false);
        let result = capture.capture(Duration::from_secs(5), &cancel, &mut |_| {});
        assert!(matches!(result, Err(CaptureError::Unavailable)));
    }

    #[test]
    fn test_unknown_app_is_a_launch_error() {
        let launcher = SystemLauncher;
        let result = launcher.open_app("winamp");
        assert!(matches!(result, Err(ParleyError::LaunchError(_))));
    }

    #[test]
    fn test_lookup_error_display() {
        let e = LookupError::NotFound("ada".to_string());
        assert!(e.to_string().contains("ada"));
    }
}
