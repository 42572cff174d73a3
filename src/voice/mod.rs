//! Voice capture session state machine
//!
//! At most one capture session exists at a time. A second activation while a
//! session is live is a cancel request, not a new session. Session ids are
//! monotonically increasing so a worker result arriving after cancellation is
//! recognized as stale and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Capture pipeline state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceState {
    /// No capture in progress
    #[default]
    Idle,
    /// Microphone channel held, recording
    Listening,
    /// Recording finished, transcription running
    Processing,
}

impl VoiceState {
    pub fn is_idle(&self) -> bool {
        matches!(self, VoiceState::Idle)
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, VoiceState::Listening)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, VoiceState::Processing)
    }

    /// Check if a session is live (not idle)
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }
}

impl std::fmt::Display for VoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceState::Idle => write!(f, "Idle"),
            VoiceState::Listening => write!(f, "Listening"),
            VoiceState::Processing => write!(f, "Processing"),
        }
    }
}

/// One microphone-capture attempt
#[derive(Clone, Debug)]
pub struct VoiceSession {
    id: u64,
    cancel: Arc<AtomicBool>,
}

impl VoiceSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Shared cancellation flag handed to the capture worker
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Result of a toggle request
#[derive(Clone, Debug)]
pub enum ToggleAction {
    /// A new session was started; spawn a capture worker for it
    Started(VoiceSession),
    /// The live session was cancelled
    Cancelled,
}

/// Owns the single voice session and its state transitions.
///
/// Lives inside the dispatcher worker loop; capture workers talk back to it
/// only through messages carrying the session id.
#[derive(Debug, Default)]
pub struct VoiceCoordinator {
    state: VoiceState,
    session: Option<VoiceSession>,
    next_id: u64,
}

impl VoiceCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Handle a user toggle: start a session from idle, cancel otherwise.
    pub fn toggle(&mut self) -> ToggleAction {
        match self.session.take() {
            None => {
                self.next_id += 1;
                let session = VoiceSession {
                    id: self.next_id,
                    cancel: Arc::new(AtomicBool::new(false)),
                };
                self.session = Some(session.clone());
                self.state = VoiceState::Listening;
                ToggleAction::Started(session)
            }
            Some(session) => {
                session.cancel.store(true, Ordering::SeqCst);
                self.state = VoiceState::Idle;
                ToggleAction::Cancelled
            }
        }
    }

    /// Worker reported the Listening -> Processing edge.
    ///
    /// Ignored for stale or cancelled sessions.
    pub fn mark_processing(&mut self, session_id: u64) -> bool {
        match &self.session {
            Some(s) if s.id == session_id && !s.is_cancelled() => {
                self.state = VoiceState::Processing;
                true
            }
            _ => false,
        }
    }

    /// Worker finished. Returns true when the result belongs to the live
    /// session and must be acted on; stale and cancelled results return false
    /// and the session state is left untouched for them.
    pub fn complete(&mut self, session_id: u64) -> bool {
        match &self.session {
            Some(s) if s.id == session_id => {
                let cancelled = s.is_cancelled();
                self.session = None;
                self.state = VoiceState::Idle;
                !cancelled
            }
            _ => false,
        }
    }
}
