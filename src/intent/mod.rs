//! Utterance normalization and keyword intent classification
//!
//! Classification is ordered, first-match-wins substring matching. The rule
//! order is load-bearing: overlapping keywords ("search" vs "news", "open
//! chrome" vs a generic search) resolve by list priority, so rules must stay
//! in exactly this order.

/// Where an utterance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Typed,
    Voice,
}

/// A normalized unit of user input.
///
/// Created once at the dispatcher boundary (lower-cased, trimmed) and
/// consumed once by `interpret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    origin: Origin,
}

impl Utterance {
    pub fn new(raw: &str, origin: Origin) -> Self {
        Self {
            text: raw.trim().to_lowercase(),
            origin,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Application targets the assistant knows how to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTarget {
    Chrome,
    Code,
}

impl AppTarget {
    /// Logical name passed to the launcher collaborator
    pub fn launch_name(&self) -> &'static str {
        match self {
            AppTarget::Chrome => "chrome",
            AppTarget::Code => "code",
        }
    }

    /// Human-readable name used in responses
    pub fn display_name(&self) -> &'static str {
        match self {
            AppTarget::Chrome => "Chrome",
            AppTarget::Code => "Visual Studio Code",
        }
    }
}

/// The classified purpose of an utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    OpenApp { target: AppTarget },
    PlayMusic,
    GetTime,
    WebSearch { query: Option<String> },
    WikiLookup { subject: String },
    Exit,
    Joke,
    Weather,
    News,
    Help,
    Converse { prompt: String },
}

/// Question phrases stripped before an encyclopedia lookup
const QUESTION_PHRASES: &[&str] = &["who is", "what is", "tell me about"];

/// One classification rule: first rule whose predicate matches wins.
type Rule = fn(&str) -> Option<Intent>;

/// Ordered priority list. Evaluated top-down; do not reorder.
const RULES: &[Rule] = &[
    |t| {
        t.contains("open chrome").then(|| Intent::OpenApp {
            target: AppTarget::Chrome,
        })
    },
    |t| {
        (t.contains("open code") || t.contains("open vs code")).then(|| Intent::OpenApp {
            target: AppTarget::Code,
        })
    },
    |t| (t.contains("play music") || t.contains("play song")).then_some(Intent::PlayMusic),
    |t| t.contains("time").then_some(Intent::GetTime),
    |t| {
        t.contains("search").then(|| Intent::WebSearch {
            query: extract_search_query(t),
        })
    },
    |t| {
        (t.contains("who is") || t.contains("what is")).then(|| Intent::WikiLookup {
            subject: strip_question_phrases(t),
        })
    },
    |t| {
        (t.contains("exit") || t.contains("quit") || t.contains("close")).then_some(Intent::Exit)
    },
    |t| t.contains("joke").then_some(Intent::Joke),
    |t| t.contains("weather").then_some(Intent::Weather),
    |t| t.contains("news").then_some(Intent::News),
    |t| t.contains("help").then_some(Intent::Help),
];

/// Classify an utterance into an intent.
///
/// Pure function of the utterance text: no side effects, no I/O. Anything
/// that matches no rule is routed to the fallback responder as `Converse`.
pub fn interpret(utterance: &Utterance) -> Intent {
    let text = utterance.text();
    for rule in RULES {
        if let Some(intent) = rule(text) {
            return intent;
        }
    }
    Intent::Converse {
        prompt: text.to_string(),
    }
}

/// Remove the literal token "search" from the utterance and trim.
///
/// An empty remainder means the query must be solicited interactively.
fn extract_search_query(text: &str) -> Option<String> {
    let remainder = normalize_spaces(&text.replace("search", ""));
    if remainder.is_empty() {
        None
    } else {
        Some(remainder)
    }
}

/// Strip the question phrases that led into an encyclopedia lookup.
fn strip_question_phrases(text: &str) -> String {
    let mut subject = text.to_string();
    for phrase in QUESTION_PHRASES {
        subject = subject.replace(phrase, "");
    }
    normalize_spaces(&subject)
}

/// Collapse runs of whitespace left behind by phrase removal.
fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
