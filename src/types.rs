//! Core types for normalized threads

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Message ID wrapper type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a synthetic message ID from the entry position
    #[must_use]
    pub fn synthetic(index: usize) -> Self {
        Self(format!("<synthetic-{index}@local>"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email address with optional display name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailAddress {
    /// Display name (e.g., "John Doe")
    pub name: Option<String>,

    /// Email address (e.g., "john@example.com")
    pub address: String,
}

impl EmailAddress {
    pub fn new(address: impl Into<String>, name: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            address: address.into().trim().to_string(),
        }
    }

    /// Parse an email address from a string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        // "Name <email@domain.com>" format
        if let Some(start) = s.find('<')
            && let Some(end) = s.rfind('>')
            && start < end
        {
            let name_part = s[..start].trim().trim_matches('"');
            let address = s[start + 1..end].trim();

            if address.contains('@') {
                return Some(Self::new(address, Some(name_part.to_string())));
            }
        }

        if s.contains('@') && !s.contains(char::is_whitespace) {
            return Some(Self::new(s, None));
        }

        None
    }

    /// Case-insensitive comparison against a bare address
    #[must_use]
    pub fn matches(&self, address: &str) -> bool {
        self.address.to_lowercase() == address.trim().to_lowercase()
    }

    /// Lowercased address, the form recipients are stored in
    #[must_use]
    pub fn normalized(&self) -> String {
        self.address.to_lowercase()
    }

    /// Domain part of the address
    #[must_use]
    pub fn domain(&self) -> &str {
        self.address
            .rsplit_once('@')
            .map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// A message reduced to the fields reply analysis needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedMessage {
    /// Identifier from the source (Message-ID, provider id, or synthetic)
    pub id: MessageId,

    /// Sender address
    pub sender: EmailAddress,

    /// Lowercased To and Cc addresses
    pub recipients: BTreeSet<String>,

    /// Date sent, with the offset from the Date header
    pub timestamp: DateTime<FixedOffset>,

    /// Decoded subject line
    pub subject: Option<String>,

    /// Flattened plain-text body
    pub body: String,
}

impl NormalizedMessage {
    #[must_use]
    pub fn is_from(&self, address: &str) -> bool {
        self.sender.matches(address)
    }
}

/// Messages of one conversation, in analysis order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thread {
    messages: Vec<NormalizedMessage>,
}

impl Thread {
    /// Build a thread sorted by timestamp; ties keep their source order
    #[must_use]
    pub fn from_messages(mut messages: Vec<NormalizedMessage>) -> Self {
        messages.sort_by_key(|m| m.timestamp);
        Self { messages }
    }

    /// Build a thread that keeps the caller's order as-is
    #[must_use]
    pub const fn from_ordered(messages: Vec<NormalizedMessage>) -> Self {
        Self { messages }
    }

    #[must_use]
    pub fn messages(&self) -> &[NormalizedMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedMessage> {
        self.messages.iter()
    }

    /// Whether timestamps never decrease along the thread
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.messages
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// Every sender and recipient seen in the thread, lowercased
    #[must_use]
    pub fn participants(&self) -> BTreeSet<String> {
        self.messages
            .iter()
            .flat_map(|m| {
                std::iter::once(m.sender.normalized()).chain(m.recipients.iter().cloned())
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Thread {
    type Item = &'a NormalizedMessage;
    type IntoIter = std::slice::Iter<'a, NormalizedMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
