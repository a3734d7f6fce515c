// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email Thread Latency
//!
//! Normalizes raw email (RFC 5322 documents, mbox files, or mail-provider
//! thread entries) into ordered threads, and measures how long a given
//! address took to reply to each incoming message.
//!
//! # Features
//!
//! - One normalized shape for local files and provider entries
//! - Stable timestamp ordering with timezone-aware dates
//! - FIFO reply matching with skew detection
//! - Plain-text reports and latency summaries
//! - Transcripts, chunking and prompts for an external summarizer
//!
//! # Example
//!
//! ```rust
//! use thread_latency::{RawEntry, RawSource, compute_reply_times, normalize};
//!
//! let question = b"From: alice@example.com\r\nTo: me@example.com\r\n\
//!     Date: Wed, 1 Jan 2025 10:00:00 +0000\r\n\r\nAre you there?".to_vec();
//! let answer = b"From: me@example.com\r\nTo: alice@example.com\r\n\
//!     Date: Wed, 1 Jan 2025 10:05:00 +0000\r\n\r\nYes.".to_vec();
//!
//! let source = RawSource::Thread(vec![RawEntry::Document(answer), RawEntry::Document(question)]);
//! let thread = normalize(&source).unwrap();
//! let records = compute_reply_times(&thread, "me@example.com");
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].latency.unwrap().num_minutes(), 5);
//! ```

mod config;
mod error;
mod normalize;
mod parser;
mod prompt;
mod provider;
mod reply;
mod report;
mod transcript;
mod types;

pub use config::AnalysisConfig;
pub use error::{Error, RequiredField, Result};
pub use normalize::{RawEntry, RawSource, normalize, normalize_each, split_mbox};
pub use parser::parse_message;
pub use prompt::{
    Category, Importance, MAX_SIGNATURE_CHARS, NOT_AVAILABLE, SignatureDetails, classification_prompt,
    importance_prompt, merge_prompt, signature_prompt, summary_prompt,
};
pub use provider::{Header, MessagePart, PartBody, ProviderEntry, ProviderThread};
pub use reply::{ReplyAnalyzer, ReplyRecord, ReplyWarning, SelfIdentity, compute_reply_times};
pub use report::{ReplySummary, latency_hours, render_report};
pub use transcript::{MAX_CHUNK_CHARS, MAX_TOKENS, TOKEN_CHAR_RATIO, chunk_messages, transcript_line};
pub use types::*;
