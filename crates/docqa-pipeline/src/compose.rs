use docqa_core::models::{AnswerStatus, Citation};
use tracing::warn;

/// Fixed decline for questions the corpus cannot ground. Never fabricated.
pub const NO_GROUNDING_ANSWER: &str = "I don't have enough information in the \
knowledge base to answer this question. Could you try rephrasing, or ask about \
something covered by the documentation?";

/// Degraded answer when generation fails after retries.
pub const UNAVAILABLE_ANSWER: &str = "I'm temporarily unable to generate an \
answer. Please try again in a moment.";

pub const GREETING_ANSWER: &str = "Hello! I'm the document Q&A assistant. I can \
answer questions about the indexed document collection and point you at the \
sources behind every answer. What would you like to know?";

pub const CAPABILITIES_ANSWER: &str = "I'm an assistant for the indexed document \
collection.\n\n\
What I can do:\n\
- Answer questions grounded in the indexed documents\n\
- Cite the exact sources each answer comes from\n\
- Tell you when the collection simply doesn't cover a topic\n\n\
What I can't do:\n\
- Answer questions outside the document collection\n\
- Access external or real-time information\n\n\
Try asking a specific question about the documentation.";

/// Phrases that signal content drawn from outside the supplied context.
const HALLUCINATION_INDICATORS: &[&str] = &[
    "it is widely known",
    "according to common knowledge",
    "in my experience",
    "as we all know",
    "everyone knows",
    "i think",
    "i believe",
    "in my opinion",
];

/// Pair the generated text with the citations that were actually
/// assembled (never whatever the model claims), and derive the
/// confidence signal.
pub fn compose_answer(generated: String, citations: &[Citation]) -> (String, AnswerStatus) {
    if citations.is_empty() {
        warn!("answer generated without assembled context; flagging as ungrounded");
        return (generated, AnswerStatus::Ungrounded);
    }
    if looks_ungrounded(&generated) {
        warn!("hallucination indicator detected in generated answer");
        return (generated, AnswerStatus::Ungrounded);
    }
    (generated, AnswerStatus::Grounded)
}

pub fn looks_ungrounded(answer: &str) -> bool {
    let answer_lower = answer.to_lowercase();
    HALLUCINATION_INDICATORS
        .iter()
        .any(|phrase| answer_lower.contains(phrase))
}
