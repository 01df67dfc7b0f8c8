use crate::models::{Classification, ScoredChunk};

/// Greeting openers; matched whole or as a word-boundary prefix.
const GREETING_PATTERNS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "howdy",
    "what's up",
    "whats up",
    "sup",
    "yo",
];

/// Capability/introduction requests; matched anywhere in the question.
const INTRO_PATTERNS: &[&str] = &[
    "who are you",
    "what are you",
    "what can you do",
    "what do you do",
    "tell me about yourself",
    "introduce yourself",
    "your capabilities",
    "help me",
    "what is this",
    "how does this work",
];

/// Three-way routing of an incoming question. Pure: owns no state, reads
/// nothing but its arguments, so it is testable without live model calls.
///
/// `retrieval` is `None` before retrieval has run. Conversational
/// questions are detected up front and short-circuit retrieval entirely;
/// out-of-scope is only decided once a retrieval outcome with zero
/// qualifying chunks is in hand.
pub fn classify(question: &str, retrieval: Option<&[ScoredChunk]>) -> Classification {
    if is_conversational(question) {
        return Classification::Conversational;
    }
    match retrieval {
        Some(chunks) if chunks.is_empty() => Classification::OutOfScope,
        _ => Classification::Knowledge,
    }
}

pub fn is_conversational(question: &str) -> bool {
    is_greeting(question) || is_intro_request(question)
}

pub fn is_greeting(question: &str) -> bool {
    let q = normalized(question);
    GREETING_PATTERNS.iter().any(|g| {
        q == *g
            || q.strip_prefix(g)
                .is_some_and(|rest| rest.starts_with([' ', ',']))
    })
}

pub fn is_intro_request(question: &str) -> bool {
    let q = normalized(question);
    INTRO_PATTERNS.iter().any(|p| q.contains(p))
}

fn normalized(question: &str) -> String {
    question
        .trim()
        .to_lowercase()
        .trim_end_matches(['!', '.', '?'])
        .trim_end()
        .to_string()
}
