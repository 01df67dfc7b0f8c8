//! Lexical-overlap scoring heuristics.
//!
//! All metrics return values in [0, 1]. The formulas are intentionally
//! simple and swappable: a model-graded variant can replace any of these
//! free functions without touching the evaluation runner.

use docqa_core::models::Citation;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("static regex"));
static NUMBERED_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\d+\.").expect("static regex"));

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "been", "be", "have", "has", "had", "do", "does", "did",
    "will", "would", "should", "can", "could", "may", "might", "this", "that", "these", "those",
];

/// Question words excluded on top of the stop list when extracting the
/// terms an answer should address.
const QUESTION_WORDS: &[&str] = &[
    "what", "when", "where", "which", "who", "whom", "whose", "how", "does", "why",
];

/// Responses that correctly admit a lack of grounding.
const NO_INFO_PHRASES: &[&str] = &[
    "don't have enough information",
    "couldn't find any relevant information",
    "cannot answer",
    "no information available",
    "temporarily unable",
];

static STOP_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_no_info_answer(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    NO_INFO_PHRASES.iter().any(|p| lower.contains(p))
}

fn meaningful_words(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() > 3 && !STOP_SET.contains(w.as_str()))
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Fraction of expected-relevant sources present among the returned
/// citations. Without source labels, falls back to keyword presence in
/// the retrieved text blended with the mean similarity.
pub fn retrieval_score(
    citations: &[Citation],
    retrieved_text: &str,
    expected_sources: &[String],
    expected_keywords: &[String],
) -> f32 {
    if citations.is_empty() {
        return 0.0;
    }
    if !expected_sources.is_empty() {
        let found = expected_sources
            .iter()
            .filter(|s| citations.iter().any(|c| c.source_uri.contains(s.as_str())))
            .count();
        return found as f32 / expected_sources.len() as f32;
    }

    let mean_score =
        citations.iter().map(|c| c.score).sum::<f32>() / citations.len() as f32;
    if expected_keywords.is_empty() {
        return mean_score.clamp(0.0, 1.0);
    }
    let text_lower = retrieved_text.to_lowercase();
    let present = expected_keywords
        .iter()
        .filter(|k| text_lower.contains(&k.to_lowercase()))
        .count();
    let keyword_score = present as f32 / expected_keywords.len() as f32;
    (keyword_score * 0.6 + mean_score * 0.4).clamp(0.0, 1.0)
}

/// Per-sentence grounding of the answer against the assembled context,
/// with graded credit by meaningful-word overlap.
pub fn faithfulness_score(answer: &str, context: &str, had_citations: bool) -> f32 {
    if answer.is_empty() {
        return 0.0;
    }
    if is_no_info_answer(answer) {
        // Declining is the correct behavior without grounding; with
        // grounding in hand it is merely conservative.
        return if had_citations { 0.8 } else { 1.0 };
    }
    if context.is_empty() {
        return 0.0;
    }

    let context_words = meaningful_words(context);
    let sentences = split_sentences(answer);
    if sentences.is_empty() {
        return 0.5;
    }

    let mut grounded = 0.0f32;
    let mut weakly_grounded = 0usize;
    for sentence in &sentences {
        if sentence.split_whitespace().count() < 5 {
            // transitional sentence, no penalty
            grounded += 1.0;
            continue;
        }
        let words = meaningful_words(sentence);
        if words.is_empty() {
            continue;
        }
        let overlap = words.intersection(&context_words).count() as f32 / words.len() as f32;
        if overlap >= 0.55 {
            grounded += 1.0;
        } else if overlap >= 0.45 {
            grounded += 0.85;
        } else if overlap >= 0.35 {
            grounded += 0.65;
        } else if overlap >= 0.25 {
            weakly_grounded += 1;
            grounded += 0.35;
        }
    }

    let total = sentences.len() as f32;
    let mut score = grounded / total;
    if weakly_grounded as f32 / total > 0.25 {
        score *= 0.85;
    }
    score.clamp(0.0, 1.0)
}

/// Alignment between answer content and the question's intent: coverage
/// of the question's meaningful terms plus a small length factor.
pub fn relevance_score(question: &str, answer: &str) -> f32 {
    if answer.is_empty() || question.is_empty() {
        return 0.0;
    }
    if is_no_info_answer(answer) {
        return 1.0;
    }

    let question_terms: HashSet<String> = meaningful_words(question)
        .into_iter()
        .filter(|w| !QUESTION_WORDS.contains(&w.as_str()))
        .collect();
    if question_terms.is_empty() {
        return 0.6;
    }

    let answer_words = meaningful_words(answer);
    let addressed = question_terms.intersection(&answer_words).count();
    let coverage = addressed as f32 / question_terms.len() as f32;

    let word_count = answer.split_whitespace().count();
    let length_factor = if word_count >= 200 {
        0.18
    } else if word_count >= 100 {
        0.15
    } else if word_count >= 50 {
        0.10
    } else {
        0.05
    };

    (coverage * 0.78 + length_factor).min(0.95)
}

/// Coverage of the expected keywords plus length/structure signals for
/// multi-part answers.
pub fn completeness_score(answer: &str, expected_keywords: &[String]) -> f32 {
    if answer.is_empty() {
        return 0.0;
    }
    if is_no_info_answer(answer) {
        return 1.0;
    }

    let answer_lower = answer.to_lowercase();
    let structure_bonus = if NUMBERED_LIST_RE.is_match(answer) {
        0.12
    } else if answer.matches("\n-").count() >= 3 || answer.matches("\n*").count() >= 3 {
        0.08
    } else if answer.matches("\n\n").count() >= 2 {
        0.05
    } else {
        0.0
    };

    let mut scores = Vec::new();
    if !expected_keywords.is_empty() {
        let found = expected_keywords
            .iter()
            .filter(|k| answer_lower.contains(&k.to_lowercase()))
            .count();
        let mut keyword_score = found as f32 / expected_keywords.len() as f32;
        if keyword_score < 0.6 {
            keyword_score *= 0.85;
        }
        scores.push(keyword_score);
    }

    let word_count = answer.split_whitespace().count();
    let length_score = if word_count >= 300 {
        0.95
    } else if word_count >= 200 {
        0.88
    } else if word_count >= 100 {
        0.78
    } else if word_count >= 50 {
        0.60
    } else {
        0.40
    };
    scores.push(length_score);

    let base = scores.iter().sum::<f32>() / scores.len() as f32;
    (base + structure_bonus).min(0.95)
}
