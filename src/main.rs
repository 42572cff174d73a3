use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parley::assistant::{Assistant, AssistantEvent};
use parley::config::AssistantConfig;
use parley::handlers::Services;
use parley::intent::Origin;
use parley::llm::FallbackResponder;
use parley::services::{SystemLauncher, UnavailableEncyclopedia, UnavailableVoiceCapture};
use parley::transcript::Sender;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parley assistant");

    let services = Services {
        launcher: Arc::new(SystemLauncher),
        encyclopedia: Arc::new(UnavailableEncyclopedia),
        responder: Arc::new(FallbackResponder::basic()),
    };

    let (assistant, handle) = Assistant::new(
        AssistantConfig::default(),
        services,
        Arc::new(UnavailableVoiceCapture),
    );
    let worker = assistant.start();

    // When a parameter prompt is outstanding, the next stdin line answers it
    // instead of being classified as a fresh utterance.
    let awaiting_parameter = Arc::new(AtomicBool::new(false));

    // Feed stdin lines to the assistant; "/voice" toggles capture.
    let input_handle = handle.clone();
    let awaiting = Arc::clone(&awaiting_parameter);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let result = if line.trim() == "/voice" {
                input_handle.toggle_voice_capture()
            } else if awaiting.swap(false, Ordering::SeqCst) {
                input_handle.provide_parameter(line)
            } else {
                input_handle.submit_utterance(line, Origin::Typed)
            };
            if result.is_err() {
                break;
            }
        }
    });

    loop {
        match handle.recv_event() {
            Ok(AssistantEvent::Transcript(entry)) => {
                let who = match entry.sender {
                    Sender::User => "You",
                    Sender::Assistant => "Parley",
                };
                println!(
                    "[{}] {}: {}",
                    entry.timestamp.format("%H:%M"),
                    who,
                    entry.text
                );
            }
            Ok(AssistantEvent::Speak { text }) => {
                info!("Speak request: {}", text);
            }
            Ok(AssistantEvent::Status { message }) => {
                info!("Status: {}", message);
            }
            Ok(AssistantEvent::ParameterPrompt { .. }) => {
                awaiting_parameter.store(true, Ordering::SeqCst);
            }
            Ok(AssistantEvent::Terminate) => {
                info!("Terminate received");
                let _ = handle.shutdown();
            }
            Ok(AssistantEvent::Shutdown) | Err(_) => break,
        }
    }

    let _ = worker.join();
    Ok(())
}
