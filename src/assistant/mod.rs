//! Assistant orchestrator: input dispatch and concurrency coordination
//!
//! A single worker thread owns classification, dispatch, the voice session
//! state machine, and the pending-parameter slot. The presentation layer
//! talks to it only through bounded channels: commands in, events out.
//! Long-running operations (voice capture, LLM inference, the exit grace
//! timer) each run on their own fire-and-forget thread and report back by
//! sending commands into the same loop, never by mutating state directly.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::config::AssistantConfig;
use crate::handlers::{
    self, HandlerOutcome, PendingAction, Response, Services, INTERNAL_ERROR_RESPONSE,
};
use crate::intent::{interpret, Origin, Utterance};
use crate::services::{CaptureError, CapturePhase, VoiceCapture};
use crate::transcript::TranscriptEntry;
use crate::voice::{ToggleAction, VoiceCoordinator};
use crate::{ParleyError, Result};

/// Greeting issued once when the worker starts
pub const WELCOME: &str = "Welcome! How can I assist you today?";

/// Response posted when voice capture is not installed
const CAPTURE_UNAVAILABLE_RESPONSE: &str =
    "Speech recognition is not available. Please install a speech recognizer to use voice input.";

/// Commands accepted by the assistant worker.
///
/// The capture variants are sent by capture workers, not the presentation
/// layer; they carry the session id so stale results can be dropped.
#[derive(Debug, Clone)]
pub enum AssistantCommand {
    /// A new utterance arrived from the presentation layer
    SubmitUtterance { text: String, origin: Origin },

    /// The value collected for an outstanding parameter prompt
    ProvideParameter(String),

    /// Toggle the voice capture session on or off
    ToggleVoiceCapture,

    /// Capture worker reported a phase edge
    CapturePhase { session: u64, phase: CapturePhase },

    /// Capture worker finished
    CaptureFinished {
        session: u64,
        outcome: std::result::Result<String, CaptureError>,
    },

    /// Shut the worker down
    Shutdown,
}

/// Events emitted by the assistant worker
#[derive(Debug, Clone)]
pub enum AssistantEvent {
    /// Append a line to the transcript
    Transcript(TranscriptEntry),

    /// Request speech synthesis for the text
    Speak { text: String },

    /// Status indicator changed
    Status { message: String },

    /// A follow-up parameter is being solicited
    ParameterPrompt { prompt: String },

    /// The interactive surface should terminate
    Terminate,

    /// Worker has shut down
    Shutdown,
}

/// Handle for driving the assistant from the presentation layer
#[derive(Clone)]
pub struct AssistantHandle {
    command_tx: Sender<AssistantCommand>,
    event_rx: Receiver<AssistantEvent>,
}

impl AssistantHandle {
    /// Submit a typed or transcribed utterance
    pub fn submit_utterance(&self, text: impl Into<String>, origin: Origin) -> Result<()> {
        self.send(AssistantCommand::SubmitUtterance {
            text: text.into(),
            origin,
        })
    }

    /// Provide the value for an outstanding parameter prompt
    pub fn provide_parameter(&self, value: impl Into<String>) -> Result<()> {
        self.send(AssistantCommand::ProvideParameter(value.into()))
    }

    /// Toggle voice capture
    pub fn toggle_voice_capture(&self) -> Result<()> {
        self.send(AssistantCommand::ToggleVoiceCapture)
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.send(AssistantCommand::Shutdown)
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<AssistantEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> Result<AssistantEvent> {
        self.event_rx
            .recv()
            .map_err(|e| ParleyError::ChannelError(format!("Failed to receive event: {}", e)))
    }

    /// Receive an event with a timeout
    pub fn recv_event_timeout(&self, timeout: Duration) -> Result<Option<AssistantEvent>> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ParleyError::ChannelError(
                "Event channel disconnected".to_string(),
            )),
        }
    }

    fn send(&self, cmd: AssistantCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| ParleyError::ChannelError(format!("Failed to send command: {}", e)))
    }
}

/// The assistant core, to be started with [`Assistant::start`]
pub struct Assistant {
    config: AssistantConfig,
    services: Services,
    capture: Arc<dyn VoiceCapture>,
    command_tx: Sender<AssistantCommand>,
    command_rx: Receiver<AssistantCommand>,
    event_tx: Sender<AssistantEvent>,
}

impl Assistant {
    /// Create the assistant and its presentation-layer handle
    pub fn new(
        config: AssistantConfig,
        services: Services,
        capture: Arc<dyn VoiceCapture>,
    ) -> (Self, AssistantHandle) {
        let (command_tx, command_rx) = bounded(config.channel_capacity);
        let (event_tx, event_rx) = bounded(config.channel_capacity);

        let handle = AssistantHandle {
            command_tx: command_tx.clone(),
            event_rx,
        };

        let assistant = Self {
            config,
            services,
            capture,
            command_tx,
            command_rx,
            event_tx,
        };

        (assistant, handle)
    }

    /// Start the worker thread. Consumes the assistant.
    pub fn start(self) -> JoinHandle<()> {
        let worker = Worker {
            config: self.config,
            services: self.services,
            capture: self.capture,
            command_tx: self.command_tx,
            command_rx: self.command_rx,
            event_tx: self.event_tx,
            coordinator: VoiceCoordinator::new(),
            pending: None,
        };

        thread::spawn(move || worker.run())
    }
}

struct Worker {
    config: AssistantConfig,
    services: Services,
    capture: Arc<dyn VoiceCapture>,
    command_tx: Sender<AssistantCommand>,
    command_rx: Receiver<AssistantCommand>,
    event_tx: Sender<AssistantEvent>,
    coordinator: VoiceCoordinator,
    pending: Option<PendingAction>,
}

impl Worker {
    fn run(mut self) {
        info!("Assistant worker started");
        self.respond(Response::same(WELCOME));
        self.status("Ready");

        loop {
            match self.command_rx.recv() {
                Ok(cmd) => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Command channel disconnected: {}", e);
                    break;
                }
            }
        }

        info!("Assistant worker stopped");
    }

    /// Process one command. Returns false to stop the loop.
    fn handle_command(&mut self, cmd: AssistantCommand) -> bool {
        match cmd {
            AssistantCommand::SubmitUtterance { text, origin } => {
                self.handle_utterance(&text, origin);
                true
            }

            AssistantCommand::ProvideParameter(value) => {
                self.handle_parameter(&value);
                true
            }

            AssistantCommand::ToggleVoiceCapture => {
                self.handle_toggle();
                true
            }

            AssistantCommand::CapturePhase { session, phase } => {
                if phase == CapturePhase::Processing && self.coordinator.mark_processing(session) {
                    self.status("Processing speech...");
                }
                true
            }

            AssistantCommand::CaptureFinished { session, outcome } => {
                self.handle_capture_finished(session, outcome);
                true
            }

            AssistantCommand::Shutdown => {
                info!("Assistant shutdown requested");
                let _ = self.event_tx.send(AssistantEvent::Shutdown);
                false
            }
        }
    }

    fn handle_utterance(&mut self, text: &str, origin: Origin) {
        let utterance = Utterance::new(text, origin);
        if utterance.is_empty() {
            debug!("Ignoring empty utterance");
            return;
        }

        if self.pending.take().is_some() {
            debug!("New utterance supersedes the outstanding parameter prompt");
        }

        let _ = self
            .event_tx
            .send(AssistantEvent::Transcript(TranscriptEntry::user(
                text.trim(),
            )));

        let intent = interpret(&utterance);
        debug!("Classified {:?} utterance as {:?}", origin, intent);

        // A panicking handler must never take the session down with it.
        let services = self.services.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| handlers::dispatch(intent, &services)))
            .unwrap_or_else(|_| {
                warn!("Handler panicked; substituting generic error response");
                HandlerOutcome::Reply(Response::same(INTERNAL_ERROR_RESPONSE))
            });

        match outcome {
            HandlerOutcome::Reply(response) => self.respond(response),

            HandlerOutcome::NeedParameter { prompt, pending } => {
                self.pending = Some(pending);
                self.respond(Response::same(prompt.clone()));
                let _ = self.event_tx.send(AssistantEvent::ParameterPrompt { prompt });
            }

            HandlerOutcome::ReplyAndExit(response) => {
                self.respond(response);
                self.schedule_termination();
            }

            // The deferred bodies call collaborators too, so they get the
            // same panic boundary as phase-1 dispatch. The Response and the
            // trailing Ready status must arrive on every path.
            HandlerOutcome::Lookup { subject } => {
                self.status(&format!("Searching the encyclopedia for {}...", subject));
                let services = self.services.clone();
                let event_tx = self.event_tx.clone();
                thread::spawn(move || {
                    let response =
                        catch_unwind(AssertUnwindSafe(|| handlers::wiki_response(&services, &subject)))
                            .unwrap_or_else(|_| {
                                warn!("Encyclopedia lookup panicked; substituting generic error response");
                                Response::same(INTERNAL_ERROR_RESPONSE)
                            });
                    emit_response(&event_tx, response);
                    let _ = event_tx.send(AssistantEvent::Status {
                        message: "Ready".to_string(),
                    });
                });
            }

            HandlerOutcome::Converse { prompt } => {
                self.status("Thinking...");
                let responder = Arc::clone(&self.services.responder);
                let event_tx = self.event_tx.clone();
                thread::spawn(move || {
                    let response = catch_unwind(AssertUnwindSafe(|| responder.respond(&prompt)))
                        .map(Response::same)
                        .unwrap_or_else(|_| {
                            warn!("Fallback responder panicked; substituting generic error response");
                            Response::same(INTERNAL_ERROR_RESPONSE)
                        });
                    emit_response(&event_tx, response);
                    let _ = event_tx.send(AssistantEvent::Status {
                        message: "Ready".to_string(),
                    });
                });
            }
        }
    }

    fn handle_parameter(&mut self, value: &str) {
        let Some(pending) = self.pending.take() else {
            debug!("No parameter pending, ignoring value");
            return;
        };

        let value = value.trim();
        if value.is_empty() {
            debug!("Empty parameter value, keeping the prompt open");
            self.pending = Some(pending);
            return;
        }

        // Echo the collected value as a user line, like a typed follow-up
        let echo = match pending {
            PendingAction::PlayMusic => format!("Play {}", value),
            PendingAction::WebSearch => format!("Search for {}", value),
        };
        let _ = self
            .event_tx
            .send(AssistantEvent::Transcript(TranscriptEntry::user(echo)));

        let response = handlers::resolve_parameter(pending, value, &self.services);
        self.respond(response);
    }

    fn handle_toggle(&mut self) {
        match self.coordinator.toggle() {
            ToggleAction::Started(session) => {
                self.status("Listening...");
                let capture = Arc::clone(&self.capture);
                let cancel = session.cancel_flag();
                let command_tx = self.command_tx.clone();
                let timeout = self.config.capture_timeout;
                let session_id = session.id();

                thread::spawn(move || {
                    let phase_tx = command_tx.clone();
                    let mut on_phase = move |phase: CapturePhase| {
                        let _ = phase_tx.send(AssistantCommand::CapturePhase {
                            session: session_id,
                            phase,
                        });
                    };
                    let outcome = capture.capture(timeout, &cancel, &mut on_phase);
                    let _ = command_tx.send(AssistantCommand::CaptureFinished {
                        session: session_id,
                        outcome,
                    });
                });
            }
            ToggleAction::Cancelled => {
                self.status("Voice input cancelled");
            }
        }
    }

    fn handle_capture_finished(
        &mut self,
        session: u64,
        outcome: std::result::Result<String, CaptureError>,
    ) {
        if !self.coordinator.complete(session) {
            debug!("Dropping stale capture result for session {}", session);
            return;
        }

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                self.status("Ready");
                self.handle_utterance(&text, Origin::Voice);
            }
            Ok(_) => {
                self.status("Couldn't understand audio");
            }
            Err(CaptureError::Unavailable) => {
                self.respond(Response::same(CAPTURE_UNAVAILABLE_RESPONSE));
                self.status("Ready");
            }
            Err(CaptureError::NoSpeech) | Err(CaptureError::Timeout) => {
                self.status("Couldn't understand audio");
            }
            Err(CaptureError::Io(detail)) => {
                warn!("Voice capture failed: {}", detail);
                self.status(&format!("Error: {}", detail));
            }
        }
    }

    /// Emit the response: transcript entry first, then the speak request.
    fn respond(&self, response: Response) {
        emit_response(&self.event_tx, response);
    }

    fn status(&self, message: &str) {
        let _ = self.event_tx.send(AssistantEvent::Status {
            message: message.to_string(),
        });
    }

    /// Emit Terminate after the grace delay so synthesis can begin first.
    fn schedule_termination(&self) {
        let event_tx = self.event_tx.clone();
        let grace = self.config.exit_grace;
        thread::spawn(move || {
            thread::sleep(grace);
            let _ = event_tx.send(AssistantEvent::Terminate);
        });
    }
}

/// Transcript append happens-before the speak request for every response.
fn emit_response(event_tx: &Sender<AssistantEvent>, response: Response) {
    let _ = event_tx.send(AssistantEvent::Transcript(TranscriptEntry::assistant(
        response.text,
    )));
    let _ = event_tx.send(AssistantEvent::Speak {
        text: response.spoken,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FallbackResponder;
    use crate::services::{AppLauncher, Encyclopedia, LookupError, UnavailableVoiceCapture};

    struct NoopLauncher;

    impl AppLauncher for NoopLauncher {
        fn open_app(&self, _: &str) -> Result<()> {
            Ok(())
        }
        fn open_url(&self, _: &str) -> Result<()> {
            Ok(())
        }
    }

    struct EmptyEncyclopedia;

    impl Encyclopedia for EmptyEncyclopedia {
        fn summarize(&self, subject: &str) -> std::result::Result<String, LookupError> {
            Err(LookupError::NotFound(subject.to_string()))
        }
    }

    fn test_services() -> Services {
        Services {
            launcher: Arc::new(NoopLauncher),
            encyclopedia: Arc::new(EmptyEncyclopedia),
            responder: Arc::new(FallbackResponder::basic()),
        }
    }

    fn spawn_assistant() -> (AssistantHandle, JoinHandle<()>) {
        let (assistant, handle) = Assistant::new(
            AssistantConfig::default(),
            test_services(),
            Arc::new(UnavailableVoiceCapture),
        );
        let join = assistant.start();
        (handle, join)
    }

    #[test]
    fn test_welcome_is_emitted_on_start() {
        let (handle, join) = spawn_assistant();

        match handle.recv_event().unwrap() {
            AssistantEvent::Transcript(entry) => assert_eq!(entry.text, WELCOME),
            other => panic!("expected welcome transcript, got {:?}", other),
        }
        match handle.recv_event().unwrap() {
            AssistantEvent::Speak { text } => assert_eq!(text, WELCOME),
            other => panic!("expected welcome speak, got {:?}", other),
        }

        handle.shutdown().unwrap();
        join.join().unwrap();
    }

    #[test]
    fn test_shutdown_emits_event_and_stops_worker() {
        let (handle, join) = spawn_assistant();
        handle.shutdown().unwrap();

        loop {
            match handle.recv_event().unwrap() {
                AssistantEvent::Shutdown => break,
                _ => continue,
            }
        }
        join.join().unwrap();
    }

    #[test]
    fn test_empty_utterance_produces_no_response() {
        let (handle, join) = spawn_assistant();
        handle.submit_utterance("   ", Origin::Typed).unwrap();
        handle.shutdown().unwrap();

        let mut transcripts = 0;
        loop {
            match handle.recv_event().unwrap() {
                AssistantEvent::Shutdown => break,
                AssistantEvent::Transcript(_) => transcripts += 1,
                _ => {}
            }
        }
        // Only the welcome line
        assert_eq!(transcripts, 1);
        join.join().unwrap();
    }
}
