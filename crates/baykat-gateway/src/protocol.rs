//! Streaming protocol — SSE events for `/chat/stream`
//!
//! A stream is `routing`, then `token` repeated, then exactly one terminal
//! `done` or `error`. Token fragments carry the answer's own whitespace, so
//! concatenating them reproduces the final text byte for byte.

use serde::{Deserialize, Serialize};

use baykat_core::types::Language;

/// Words per `token` event. Small enough to feel live, large enough to keep
/// event overhead low.
pub const WORDS_PER_TOKEN: usize = 3;

/// Event names on the wire
pub mod events {
    pub const ROUTING: &str = "routing";
    pub const TOKEN: &str = "token";
    pub const DONE: &str = "done";
    pub const ERROR: &str = "error";
}

/// One server-sent event of the chat stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Emitted first, as soon as the topics are known.
    Routing { agents: Vec<String> },
    /// A fragment of the final answer, in order.
    Token { text: String },
    /// Terminal: the request succeeded.
    Done {
        agents_used: Vec<String>,
        language: Language,
    },
    /// Terminal: the request failed.
    Error { message: String },
}

impl StreamEvent {
    /// SSE event name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Routing { .. } => events::ROUTING,
            Self::Token { .. } => events::TOKEN,
            Self::Done { .. } => events::DONE,
            Self::Error { .. } => events::ERROR,
        }
    }
}

/// Split a text into word-group fragments whose concatenation is exactly the
/// input. Each fragment keeps the whitespace that followed its words, so the
/// separator between fragments rides at the end of the earlier one.
pub fn chunk_text(text: &str, words_per_chunk: usize) -> Vec<String> {
    assert!(words_per_chunk > 0);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut words_in_chunk = 0;
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if in_word {
                words_in_chunk += 1;
                in_word = false;
            }
            current.push(ch);
        } else {
            if !in_word && words_in_chunk >= words_per_chunk {
                chunks.push(std::mem::take(&mut current));
                words_in_chunk = 0;
            }
            in_word = true;
            current.push(ch);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
