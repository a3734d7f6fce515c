//! Message normalizer: raw sources in, ordered threads out

use crate::error::Result;
use crate::parser::parse_document;
use crate::provider::ProviderEntry;
use crate::types::{NormalizedMessage, Thread};
use regex::bytes::Regex;
use std::sync::LazyLock;
use tracing::debug;

// mbox "From " separator lines and mboxrd-escaped body lines
static MBOX_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^From [^\r\n]*(?:\r?\n|$)").unwrap());

static MBOX_ESCAPED_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^>(>*From )").unwrap());

/// A single raw message in one of the supported shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    /// RFC 5322 bytes, e.g. a local `.eml` file
    Document(Vec<u8>),
    /// An entry returned by a mail provider's thread endpoint
    Provider(ProviderEntry),
}

impl RawEntry {
    /// Normalize this entry; `index` is its position in the source
    pub fn normalize(&self, index: usize) -> Result<NormalizedMessage> {
        match self {
            Self::Document(raw) => parse_document(index, raw, None),
            Self::Provider(entry) => entry.normalize(index),
        }
    }
}

/// Everything the normalizer accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSource {
    Single(RawEntry),
    Thread(Vec<RawEntry>),
    /// An mbox file holding one or more documents
    Mbox(Vec<u8>),
}

/// Normalize a raw source into a thread sorted by timestamp.
///
/// Fails on the first entry missing a sender or timestamp; use
/// [`normalize_each`] to decide per entry instead.
pub fn normalize(source: &RawSource) -> Result<Thread> {
    let messages = match source {
        RawSource::Single(entry) => vec![entry.normalize(0)?],
        RawSource::Thread(entries) => normalize_each(entries)
            .into_iter()
            .collect::<Result<Vec<_>>>()?,
        RawSource::Mbox(raw) => split_mbox(raw)
            .iter()
            .enumerate()
            .map(|(index, doc)| parse_document(index, doc, None))
            .collect::<Result<Vec<_>>>()?,
    };

    let thread = Thread::from_messages(messages);
    debug!("Normalized thread of {} message(s)", thread.len());

    Ok(thread)
}

/// Normalize every entry independently, one result per entry in input order
#[must_use]
pub fn normalize_each(entries: &[RawEntry]) -> Vec<Result<NormalizedMessage>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| entry.normalize(index))
        .collect()
}

/// Split mbox content into its documents.
///
/// Content that does not start with a `From ` separator is a single
/// document and is returned as-is. Blank content holds no documents.
#[must_use]
pub fn split_mbox(raw: &[u8]) -> Vec<Vec<u8>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Vec::new();
    }

    let separators: Vec<_> = MBOX_SEPARATOR.find_iter(raw).collect();

    let starts_with_separator = separators.first().is_some_and(|m| m.start() == 0);
    if !starts_with_separator {
        return vec![raw.to_vec()];
    }

    separators
        .iter()
        .enumerate()
        .map(|(i, sep)| {
            let end = separators.get(i + 1).map_or(raw.len(), |next| next.start());
            let message = &raw[sep.end()..end];
            MBOX_ESCAPED_FROM.replace_all(message, &b"$1"[..]).into_owned()
        })
        .filter(|message| !message.iter().all(u8::is_ascii_whitespace))
        .collect()
}
