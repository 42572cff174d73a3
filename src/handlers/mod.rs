//! Intent handlers
//!
//! Each intent maps to a handler producing a `HandlerOutcome`. Quick handlers
//! (launch, time, joke, help, search URL) complete inline; slow ones
//! (encyclopedia lookup, LLM conversation) are returned as deferred outcomes
//! so the dispatcher can run them on a background worker. Handlers degrade
//! every failure to a speakable response; nothing propagates outward.

use std::sync::Arc;

use chrono::Local;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::intent::Intent;
use crate::llm::FallbackResponder;
use crate::services::{AppLauncher, Encyclopedia, LookupError};

/// Fixed joke list, selected from uniformly at random
pub const JOKES: &[&str] = &[
    "Why don't scientists trust atoms? Because they make up everything!",
    "I told my wife she was drawing her eyebrows too high. She looked surprised.",
    "Parallel lines have so much in common. It's a shame they'll never meet.",
    "Why did the scarecrow win an award? Because he was outstanding in his field!",
];

/// Full command listing shown in the transcript for "help"
pub const HELP_TEXT: &str = "Available commands:\n\
- \"Time\" - Get the current time\n\
- \"Open Chrome\" - Launch Chrome browser\n\
- \"Open VS Code\" - Launch Visual Studio Code\n\
- \"Play music\" - Search and play music on YouTube\n\
- \"Search [query]\" - Search the web\n\
- \"Who is [person]\" - Get encyclopedia information\n\
- \"What is [thing]\" - Get encyclopedia information\n\
- \"Weather\" - Check the weather\n\
- \"News\" - Get the latest news\n\
- \"Joke\" - Tell a joke\n\
- \"Exit/Quit\" - Close the application\n\
\n\
You can type commands or use the voice button to speak.";

/// Short spoken line for "help" (the full listing is display-only)
pub const HELP_SPOKEN: &str = "Here are some commands you can use with me.";

/// Farewell spoken before the termination effect is scheduled
pub const FAREWELL: &str = "Goodbye! Have a great day!";

/// Generic response when a handler fails unexpectedly
pub const INTERNAL_ERROR_RESPONSE: &str =
    "I'm sorry, something went wrong while handling that. Please try again.";

/// A response destined for both the transcript and speech synthesis.
///
/// The two texts are identical except for "help", where the spoken line is a
/// short summary of the displayed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub text: String,
    pub spoken: String,
}

impl Response {
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        let spoken = text.clone();
        Self { text, spoken }
    }

    pub fn with_spoken(text: impl Into<String>, spoken: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spoken: spoken.into(),
        }
    }
}

/// Parameter still owed by the user in a two-phase interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Waiting for a song name
    PlayMusic,
    /// Waiting for a search query
    WebSearch,
}

/// Result of phase-1 dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A complete response
    Reply(Response),

    /// A follow-up parameter must be collected before the handler can finish
    NeedParameter {
        prompt: String,
        pending: PendingAction,
    },

    /// Respond with the farewell, then schedule termination after the grace delay
    ReplyAndExit(Response),

    /// Encyclopedia lookup, to be run on a background worker
    Lookup { subject: String },

    /// LLM conversation, to be run on a background worker
    Converse { prompt: String },
}

/// The collaborators handlers are allowed to touch.
///
/// Passed explicitly to every handler call; there is no ambient process-wide
/// state.
#[derive(Clone)]
pub struct Services {
    pub launcher: Arc<dyn AppLauncher>,
    pub encyclopedia: Arc<dyn Encyclopedia>,
    pub responder: Arc<FallbackResponder>,
}

/// Phase-1 dispatch: map an intent to its outcome.
pub fn dispatch(intent: Intent, services: &Services) -> HandlerOutcome {
    match intent {
        Intent::OpenApp { target } => {
            let response = match services.launcher.open_app(target.launch_name()) {
                Ok(()) => format!("Opening {}.", target.display_name()),
                Err(e) => {
                    warn!("Launch failed for {}: {}", target.launch_name(), e);
                    format!("Failed to open {}: {}", target.launch_name(), e)
                }
            };
            HandlerOutcome::Reply(Response::same(response))
        }

        Intent::PlayMusic => HandlerOutcome::NeedParameter {
            prompt: "What song would you like to listen to?".to_string(),
            pending: PendingAction::PlayMusic,
        },

        Intent::GetTime => HandlerOutcome::Reply(Response::same(current_time_response())),

        Intent::WebSearch { query: Some(query) } => {
            HandlerOutcome::Reply(Response::same(run_search(&query, services)))
        }

        Intent::WebSearch { query: None } => HandlerOutcome::NeedParameter {
            prompt: "What would you like to search for?".to_string(),
            pending: PendingAction::WebSearch,
        },

        Intent::WikiLookup { subject } => HandlerOutcome::Lookup { subject },

        Intent::Joke => HandlerOutcome::Reply(Response::same(random_joke())),

        // Weather and news are fulfilled as canned web searches
        Intent::Weather => HandlerOutcome::Reply(Response::same(run_search("weather", services))),
        Intent::News => HandlerOutcome::Reply(Response::same(run_search("latest news", services))),

        Intent::Help => HandlerOutcome::Reply(Response::with_spoken(HELP_TEXT, HELP_SPOKEN)),

        Intent::Exit => HandlerOutcome::ReplyAndExit(Response::same(FAREWELL)),

        Intent::Converse { prompt } => HandlerOutcome::Converse { prompt },
    }
}

/// Phase-2: complete a pending two-phase interaction with the collected value.
pub fn resolve_parameter(pending: PendingAction, value: &str, services: &Services) -> Response {
    let value = value.trim();
    match pending {
        PendingAction::PlayMusic => {
            let url = format!(
                "https://www.youtube.com/results?search_query={}",
                urlencoding::encode(value)
            );
            if let Err(e) = services.launcher.open_url(&url) {
                warn!("Failed to open YouTube: {}", e);
                return Response::same(format!("Failed to open YouTube: {}", e));
            }
            Response::same(format!("Playing {} on YouTube.", value))
        }
        PendingAction::WebSearch => Response::same(run_search(value, services)),
    }
}

/// Blocking encyclopedia lookup; called from a background worker.
///
/// Any failure degrades to the web-search offer; the typed variants only
/// differ in how they are logged.
pub fn wiki_response(services: &Services, subject: &str) -> Response {
    match services.encyclopedia.summarize(subject) {
        Ok(summary) => Response::same(summary),
        Err(e) => {
            match &e {
                LookupError::NotFound(_) => warn!("No encyclopedia match for '{}'", subject),
                LookupError::Ambiguous(_) => warn!("Ambiguous encyclopedia subject '{}'", subject),
                LookupError::Io(detail) => warn!("Encyclopedia lookup I/O failure: {}", detail),
            }
            Response::same(format!(
                "I couldn't find information about {}. Would you like me to search the web instead?",
                subject
            ))
        }
    }
}

/// Build the search response and open the results page.
fn run_search(query: &str, services: &Services) -> String {
    let url = format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query)
    );
    if let Err(e) = services.launcher.open_url(&url) {
        warn!("Failed to open browser for search: {}", e);
        return format!("Failed to open the browser: {}", e);
    }
    format!("Searching for {}", query)
}

fn current_time_response() -> String {
    format!("The current time is {}", Local::now().format("%I:%M %p"))
}

fn random_joke() -> String {
    let mut rng = rand::thread_rng();
    // The list is a non-empty constant
    JOKES
        .choose(&mut rng)
        .copied()
        .unwrap_or(JOKES[0])
        .to_string()
}
