//! Error types for thread normalization

use std::fmt;
use thiserror::Error;

/// Field a normalized message cannot do without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// The `From` header
    Sender,
    /// The `Date` header
    Timestamp,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => write!(f, "sender (From header)"),
            Self::Timestamp => write!(f, "timestamp (Date header)"),
        }
    }
}

/// Errors that can occur while normalizing raw messages
#[derive(Error, Debug)]
pub enum Error {
    /// A raw entry lacks a required field
    #[error("Malformed message {entry}: {field} {reason}")]
    MalformedMessage {
        entry: String,
        field: RequiredField,
        reason: String,
    },

    /// Failed to parse the message structure
    #[error("Failed to parse message structure: {0}")]
    Structure(String),

    /// Failed to decode message content
    #[error("Failed to decode content: {0}")]
    Decode(String),

    /// Invalid analysis configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn missing(entry: impl fmt::Display, field: RequiredField) -> Self {
        Self::MalformedMessage {
            entry: entry.to_string(),
            field,
            reason: "is missing".into(),
        }
    }

    pub(crate) fn invalid(
        entry: impl fmt::Display,
        field: RequiredField,
        value: impl fmt::Display,
    ) -> Self {
        Self::MalformedMessage {
            entry: entry.to_string(),
            field,
            reason: format!("could not be parsed from \"{value}\""),
        }
    }

    /// Prefix structure and decode errors with the failing entry
    pub(crate) fn in_entry(self, entry: impl fmt::Display) -> Self {
        match self {
            Self::Structure(reason) => Self::Structure(format!("{entry}: {reason}")),
            Self::Decode(reason) => Self::Decode(format!("{entry}: {reason}")),
            other => other,
        }
    }

    /// The missing or invalid field, if this is a malformed message
    #[must_use]
    pub const fn field(&self) -> Option<RequiredField> {
        match self {
            Self::MalformedMessage { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Result type for normalization operations
pub type Result<T> = std::result::Result<T, Error>;
