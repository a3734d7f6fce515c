//! Reply-time analysis
//!
//! Walks a thread in order and credits each outgoing message to the oldest
//! incoming message still waiting for a reply (FIFO).

use crate::types::{EmailAddress, NormalizedMessage, Thread};
use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// The addresses whose messages count as replies
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelfIdentity {
    addresses: Vec<String>,
}

impl SelfIdentity {
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self::default().with_alias(address)
    }

    /// Add another address belonging to the same person
    #[must_use]
    pub fn with_alias(mut self, address: &str) -> Self {
        let address = address.trim().to_lowercase();
        if !address.is_empty() && !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
        self
    }

    #[must_use]
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    #[must_use]
    pub fn matches(&self, sender: &EmailAddress) -> bool {
        self.addresses.iter().any(|a| sender.matches(a))
    }
}

/// Non-fatal findings attached to a reply record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyWarning {
    /// The reply is timestamped before the message it answers
    NonMonotonicTimestamp {
        /// How far the reply precedes the incoming message
        skew: TimeDelta,
    },
}

impl fmt::Display for ReplyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonMonotonicTimestamp { .. } => write!(f, "non-monotonic timestamp"),
        }
    }
}

/// One incoming message and the reply credited to it, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord<'a> {
    pub incoming: &'a NormalizedMessage,
    pub reply: Option<&'a NormalizedMessage>,
    pub replied_at: Option<DateTime<FixedOffset>>,
    pub latency: Option<TimeDelta>,
    pub warning: Option<ReplyWarning>,
}

impl<'a> ReplyRecord<'a> {
    const fn unanswered(incoming: &'a NormalizedMessage) -> Self {
        Self {
            incoming,
            reply: None,
            replied_at: None,
            latency: None,
            warning: None,
        }
    }

    fn resolve(&mut self, reply: &'a NormalizedMessage) {
        let latency = reply.timestamp - self.incoming.timestamp;

        if latency < TimeDelta::zero() {
            warn!(
                "Reply {} precedes message {} by {}s",
                reply.id,
                self.incoming.id,
                -latency.num_seconds()
            );
            self.warning = Some(ReplyWarning::NonMonotonicTimestamp { skew: -latency });
        }

        self.reply = Some(reply);
        self.replied_at = Some(reply.timestamp);
        self.latency = Some(latency);
    }

    #[must_use]
    pub const fn is_answered(&self) -> bool {
        self.reply.is_some()
    }

    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        self.warning.is_some()
    }

    /// Who the incoming message came from
    #[must_use]
    pub const fn counterpart(&self) -> &'a EmailAddress {
        &self.incoming.sender
    }
}

/// Reply-time analysis for a configured identity
#[derive(Debug, Clone, Default)]
pub struct ReplyAnalyzer {
    identity: SelfIdentity,
}

impl ReplyAnalyzer {
    #[must_use]
    pub const fn new(identity: SelfIdentity) -> Self {
        Self { identity }
    }

    #[must_use]
    pub const fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    /// One record per incoming message, in thread order.
    ///
    /// Outgoing messages with nothing pending are ignored.
    #[must_use]
    pub fn analyze<'a>(&self, thread: &'a Thread) -> Vec<ReplyRecord<'a>> {
        let mut records: Vec<ReplyRecord<'a>> = Vec::new();
        let mut pending: VecDeque<usize> = VecDeque::new();

        for message in thread {
            if !self.identity.matches(&message.sender) {
                pending.push_back(records.len());
                records.push(ReplyRecord::unanswered(message));
                continue;
            }

            match pending.pop_front() {
                Some(slot) => records[slot].resolve(message),
                None => debug!("Outgoing message {} has no pending message", message.id),
            }
        }

        debug!(
            "Analyzed {} incoming message(s), {} unanswered",
            records.len(),
            pending.len()
        );

        records
    }
}

/// Compute reply latencies for `self_address` over `thread`
#[must_use]
pub fn compute_reply_times<'a>(thread: &'a Thread, self_address: &str) -> Vec<ReplyRecord<'a>> {
    ReplyAnalyzer::new(SelfIdentity::new(self_address)).analyze(thread)
}
