//! Prompts for the external language model and parsing of its labels

use crate::transcript::transcript_line;
use crate::types::NormalizedMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories a thread can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Quotation,
    OrderManagement,
    Delivery,
    InvoiceTax,
    QualityControl,
    TechnicalSupport,
    Others,
}

impl Category {
    pub const ALL: [Self; 7] = [
        Self::Quotation,
        Self::OrderManagement,
        Self::Delivery,
        Self::InvoiceTax,
        Self::QualityControl,
        Self::TechnicalSupport,
        Self::Others,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quotation => "Quotation",
            Self::OrderManagement => "Order Management",
            Self::Delivery => "Delivery",
            Self::InvoiceTax => "Invoice/Tax",
            Self::QualityControl => "Quality Control",
            Self::TechnicalSupport => "Technical Support",
            Self::Others => "Others",
        }
    }

    /// Read the model's answer; anything unrecognized is `Others`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();

        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Self::Others)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt summarizing one chunk of a thread
#[must_use]
pub fn summary_prompt(messages: &[NormalizedMessage]) -> String {
    let mut lines = vec![
        "You are an assistant that summarizes email threads.".to_string(),
        String::new(),
        "Thread messages:".to_string(),
    ];
    lines.extend(messages.iter().map(transcript_line));
    lines.push(String::new());
    lines.push("Summary:".to_string());

    lines.join("\n")
}

/// Prompt merging per-chunk summaries into one
#[must_use]
pub fn merge_prompt(partials: &[String]) -> String {
    let combined = partials
        .iter()
        .enumerate()
        .map(|(i, summary)| format!("Part {}:\n{summary}", i + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    [
        "You are an assistant that merges multiple partial summaries into one cohesive summary.",
        "",
        "Partial summaries:",
        combined.as_str(),
        "",
        "Final unified summary:",
    ]
    .join("\n")
}

/// Prompt asking for exactly one category.
///
/// `None` for blank text, which is [`Category::Others`] without asking.
#[must_use]
pub fn classification_prompt(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }

    let names = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!(
        "Please classify the following content into exactly one of these categories:\n\
         {names}\n\n\
         Content:\n{text}\n\n\
         Respond with the single category name only."
    ))
}

/// How much a message matters to its recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Importance {
    HighlyImportant,
    LessImportant,
}

impl Importance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighlyImportant => "HIGHLY IMPORTANT",
            Self::LessImportant => "LESS IMPORTANT",
        }
    }

    /// Read the model's answer; only an exact label counts, anything else is
    /// `LessImportant`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "HIGHLY IMPORTANT" => Self::HighlyImportant,
            _ => Self::LessImportant,
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt asking whether one message is highly or less important
#[must_use]
pub fn importance_prompt(message: &NormalizedMessage) -> String {
    let recipients = message
        .recipients
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an email importance classifier. Given the sender, subject line, \
         recipients and body, decide whether this message is '{high}' or '{low}'. \
         Reply with exactly one of those two.\n\n\
         Sender: {sender}\n\
         Subject: {subject}\n\
         To/Cc: {recipients}\n\n\
         Body:\n```\n{body}\n```",
        high = Importance::HighlyImportant,
        low = Importance::LessImportant,
        sender = message.sender,
        subject = message.subject.as_deref().unwrap_or_default(),
        body = message.body,
    )
}

/// Longest signature tail handed to the model, in characters
pub const MAX_SIGNATURE_CHARS: usize = 2000;

/// Placeholder for a signature field the model could not find
pub const NOT_AVAILABLE: &str = "N/A";

/// Prompt asking for the contact details in a signature block.
///
/// Only the last [`MAX_SIGNATURE_CHARS`] characters are sent.
#[must_use]
pub fn signature_prompt(signature: &str) -> String {
    let skip = signature.chars().count().saturating_sub(MAX_SIGNATURE_CHARS);
    let tail = signature
        .char_indices()
        .nth(skip)
        .map_or("", |(start, _)| &signature[start..]);

    format!(
        "You are a parser that extracts contact signature info. Given a signature \
         block from an email, reply ONLY with a JSON object with the keys: \
         name, company, address, phone, job_title. If any field is not present, \
         set its value to \"{NOT_AVAILABLE}\".\n\n\
         Signature text:\n```\n{tail}\n```"
    )
}

/// Contact details read from a signature block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDetails {
    pub name: String,
    pub company: String,
    pub address: String,
    pub phone: String,
    pub job_title: String,
}

impl Default for SignatureDetails {
    fn default() -> Self {
        Self {
            name: NOT_AVAILABLE.into(),
            company: NOT_AVAILABLE.into(),
            address: NOT_AVAILABLE.into(),
            phone: NOT_AVAILABLE.into(),
            job_title: NOT_AVAILABLE.into(),
        }
    }
}

impl SignatureDetails {
    /// Read the model's JSON answer.
    ///
    /// Missing, blank or non-string fields are [`NOT_AVAILABLE`], and so is
    /// every field when the answer is not a JSON object.
    #[must_use]
    pub fn from_reply(reply: &str) -> Self {
        let fields: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(reply.trim()).unwrap_or_default();

        let field = |key: &str| {
            fields
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string()
        };

        Self {
            name: field("name"),
            company: field("company"),
            address: field("address"),
            phone: field("phone"),
            job_title: field("job_title"),
        }
    }
}
