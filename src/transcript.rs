//! Thread text for the summarization and classification model

use crate::types::{NormalizedMessage, Thread};

/// Token budget of one summarization request
pub const MAX_TOKENS: usize = 2000;

/// Rough characters per token
pub const TOKEN_CHAR_RATIO: usize = 4;

pub const MAX_CHUNK_CHARS: usize = MAX_TOKENS * TOKEN_CHAR_RATIO;

/// `"{date} - {sender}: {body}"`
#[must_use]
pub fn transcript_line(message: &NormalizedMessage) -> String {
    format!(
        "{} - {}: {}",
        message.timestamp.to_rfc2822(),
        message.sender,
        message.body
    )
}

impl Thread {
    /// All messages as transcript lines, in thread order
    #[must_use]
    pub fn transcript(&self) -> String {
        self.iter()
            .map(transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split messages into consecutive runs whose transcript stays under
/// `max_chars`. A message longer than the limit gets a chunk of its own.
#[must_use]
pub fn chunk_messages(messages: &[NormalizedMessage], max_chars: usize) -> Vec<&[NormalizedMessage]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0;

    for (i, message) in messages.iter().enumerate() {
        // +1 for the line break
        let segment = transcript_line(message).chars().count() + 1;

        if i > start && size + segment > max_chars {
            chunks.push(&messages[start..i]);
            start = i;
            size = 0;
        }
        size += segment;
    }

    if start < messages.len() {
        chunks.push(&messages[start..]);
    }

    chunks
}
