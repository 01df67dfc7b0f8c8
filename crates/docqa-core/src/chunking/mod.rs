pub mod tokenizer;

use crate::error::DocqaError;
use crate::models::{Chunk, Document};
use docqa_config::ChunkingConfig;
use sha2::{Digest, Sha256};
use tokenizer::count_tokens;

/// Splits document text into overlapping passages.
///
/// Text is cut at paragraph and sentence boundaries (pathological
/// sentences at whitespace) and the resulting units are packed greedily
/// into token windows, carrying trailing units over as overlap. Units
/// keep their separators so they tile the document exactly, which makes
/// re-chunking identical input byte-identical.
pub struct Chunker {
    config: ChunkingConfig,
}

#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    tokens: usize,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn chunk(&self, document: &Document) -> Result<Vec<Chunk>, DocqaError> {
        let text = &document.raw_text;
        if text.trim().is_empty() {
            return Err(DocqaError::InvalidDocument {
                id: document.id.clone(),
                reason: "empty or whitespace-only text".to_string(),
            });
        }

        let window = self.config.window_tokens;
        let overlap = self.config.overlap_tokens;
        let units = build_units(text, window);

        let mut chunks = Vec::new();
        let mut win: Vec<Unit> = Vec::new();
        let mut win_tokens = 0usize;

        for unit in units {
            if !win.is_empty() && win_tokens + unit.tokens > window {
                chunks.push(make_chunk(document, &win));

                // Seed the next window with trailing units worth at most
                // `overlap` tokens, shrinking the seed if the pending unit
                // would not fit alongside it. Never seed with the whole
                // previous window: each chunk must start strictly after
                // the one before it.
                let mut seed: Vec<Unit> = Vec::new();
                let mut seed_tokens = 0usize;
                for prev in win.iter().rev().take(win.len() - 1) {
                    if seed_tokens + prev.tokens > overlap {
                        break;
                    }
                    seed_tokens += prev.tokens;
                    seed.insert(0, *prev);
                }
                while !seed.is_empty() && seed_tokens + unit.tokens > window {
                    seed_tokens -= seed.remove(0).tokens;
                }
                win = seed;
                win_tokens = seed_tokens;
            }
            win_tokens += unit.tokens;
            win.push(unit);
        }
        if !win.is_empty() {
            chunks.push(make_chunk(document, &win));
        }

        Ok(chunks)
    }
}

fn make_chunk(document: &Document, units: &[Unit]) -> Chunk {
    let start = units[0].start;
    let end = units[units.len() - 1].end;
    let token_count = units.iter().map(|u| u.tokens).sum();

    // Stable id: document id + window position.
    let mut hasher = Sha256::new();
    hasher.update(document.id.as_bytes());
    hasher.update(start.to_be_bytes());
    let hash = hex::encode(hasher.finalize());
    let id = hash[..16].to_string();

    Chunk {
        id,
        document_id: document.id.clone(),
        source_uri: document.source_uri.clone(),
        text: document.raw_text[start..end].to_string(),
        start_offset: start,
        end_offset: end,
        token_count,
    }
}

/// Break the text into sentence units no larger than `window` tokens,
/// keeping separators attached so consecutive units tile the text with
/// no gaps. Sentence granularity keeps the overlap seeding fine-grained
/// even when paragraphs are large.
fn build_units(text: &str, window: usize) -> Vec<Unit> {
    let mut units = Vec::new();
    for (ps, pe) in paragraph_bounds(text) {
        for (ss, se) in sentence_bounds(&text[ps..pe], ps) {
            let tokens = count_tokens(&text[ss..se]);
            if tokens <= window {
                units.push(Unit {
                    start: ss,
                    end: se,
                    tokens,
                });
            } else {
                units.extend(word_split(&text[ss..se], ss, window));
            }
        }
    }
    units
}

/// Paragraph spans, each including the blank-line run that terminates it.
fn paragraph_bounds(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut bounds = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let mut j = i + 1;
            let mut newlines = 1;
            while j < bytes.len() && (bytes[j] == b'\n' || bytes[j] == b'\r') {
                if bytes[j] == b'\n' {
                    newlines += 1;
                }
                j += 1;
            }
            if newlines >= 2 {
                bounds.push((start, j));
                start = j;
            }
            i = j;
        } else {
            i += 1;
        }
    }
    if start < bytes.len() {
        bounds.push((start, bytes.len()));
    }
    bounds
}

/// Sentence spans within one paragraph; trailing whitespace stays with
/// the sentence that precedes it.
fn sentence_bounds(text: &str, base: usize) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut bounds = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if matches!(bytes[i], b'.' | b'!' | b'?') {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j > i + 1 {
                bounds.push((base + start, base + j));
                start = j;
            }
            i = j;
        } else {
            i += 1;
        }
    }
    if start < bytes.len() {
        bounds.push((base + start, base + bytes.len()));
    }
    bounds
}

/// Last resort for a sentence larger than the window: pack whitespace
/// delimited words until the token budget is reached.
fn word_split(text: &str, base: usize, window: usize) -> Vec<Unit> {
    let mut out = Vec::new();
    let mut piece_start = 0usize;
    let mut piece_tokens = 0usize;
    for (ws, we) in word_bounds(text) {
        let word_tokens = count_tokens(&text[ws..we]);
        if piece_tokens > 0 && piece_tokens + word_tokens > window {
            out.push(Unit {
                start: base + piece_start,
                end: base + ws,
                tokens: piece_tokens,
            });
            piece_start = ws;
            piece_tokens = 0;
        }
        piece_tokens += word_tokens;
    }
    if piece_start < text.len() {
        out.push(Unit {
            start: base + piece_start,
            end: base + text.len(),
            tokens: piece_tokens,
        });
    }
    out
}

/// Word spans, each including its trailing whitespace run.
fn word_bounds(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            out.push((start, j));
            start = j;
            i = j;
        } else {
            i += 1;
        }
    }
    if start < bytes.len() {
        out.push((start, bytes.len()));
    }
    out
}

/// Light normalization for ingested plain text: CRLF to LF, trailing
/// whitespace stripped per line, runs of blank lines collapsed to one.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.replace("\r\n", "\n").lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_tile_the_text() {
        let text = "First paragraph.\n\nSecond paragraph.\n\n\nThird.";
        let bounds = paragraph_bounds(text);
        assert_eq!(bounds.len(), 3);
        assert_eq!(bounds[0].0, 0);
        assert_eq!(bounds[bounds.len() - 1].1, text.len());
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn sentences_keep_trailing_whitespace() {
        let text = "One sentence. Another one! A third? Tail";
        let bounds = sentence_bounds(text, 0);
        assert_eq!(bounds.len(), 4);
        assert_eq!(&text[bounds[0].0..bounds[0].1], "One sentence. ");
        assert_eq!(&text[bounds[3].0..bounds[3].1], "Tail");
    }

    #[test]
    fn normalize_collapses_blank_runs() {
        let text = "a  \n\n\n\nb\r\nc";
        assert_eq!(normalize(text), "a\n\nb\nc\n");
    }
}
