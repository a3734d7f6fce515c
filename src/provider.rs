//! Mail-provider thread entries
//!
//! Entries follow the Gmail API message resource: either a `raw` RFC 822
//! document (base64url) or a decoded `payload` tree with base64url bodies.

use crate::error::{Error, Result};
use crate::normalize::{RawEntry, RawSource};
use crate::parser::{MessageSource, TextParts, build_message, parse_document};
use crate::types::{MessageId, NormalizedMessage};
use base64::prelude::*;
use charset::Charset;
use serde::{Deserialize, Serialize};

/// One message of a provider thread
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    /// Provider message id
    pub id: String,

    #[serde(default)]
    pub thread_id: Option<String>,

    /// Milliseconds since epoch, as a string
    #[serde(default)]
    pub internal_date: Option<String>,

    /// Full RFC 822 message, base64url encoded (`format=raw`)
    #[serde(default)]
    pub raw: Option<String>,

    /// Parsed MIME tree (`format=full`)
    #[serde(default)]
    pub payload: Option<MessagePart>,
}

/// A node of the provider's MIME tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Non-empty for attachments
    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub headers: Vec<Header>,

    #[serde(default)]
    pub body: Option<PartBody>,

    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub size: Option<u64>,

    /// base64url encoded content
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub attachment_id: Option<String>,
}

/// A provider thread resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderThread {
    pub id: String,

    #[serde(default)]
    pub messages: Vec<ProviderEntry>,
}

impl ProviderEntry {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Structure(e.to_string()))
    }

    pub(crate) fn normalize(&self, index: usize) -> Result<NormalizedMessage> {
        let id = MessageId::new(self.id.as_str());

        if let Some(raw) = &self.raw {
            let bytes = decode_base64(raw).map_err(|e| e.in_entry(format!("#{index} {id}")))?;
            return parse_document(index, &bytes, Some(id));
        }

        let payload = self.payload.as_ref().ok_or_else(|| {
            Error::Structure(format!("provider entry {} has neither raw nor payload", self.id))
        })?;

        build_message(payload, id, index)
    }
}

impl ProviderThread {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Structure(e.to_string()))
    }

    /// Hand the thread's messages to the normalizer
    #[must_use]
    pub fn into_raw_source(self) -> RawSource {
        RawSource::Thread(self.messages.into_iter().map(RawEntry::Provider).collect())
    }
}

impl MessagePart {
    fn is_attachment(&self) -> bool {
        self.filename.as_ref().is_some_and(|f| !f.is_empty())
    }

    fn mime_type(&self) -> String {
        self.mime_type.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Charset named by the part's own Content-Type header
    fn charset(&self) -> Option<Charset> {
        let content_type = self.header("Content-Type")?;
        if !content_type.to_ascii_lowercase().contains("charset=") {
            return None;
        }
        let label = mailparse::parse_content_type(&content_type).charset;
        Charset::for_label(label.as_bytes())
    }

    fn decoded_body(&self) -> Result<Option<String>> {
        let Some(data) = self.body.as_ref().and_then(|b| b.data.as_deref()) else {
            return Ok(None);
        };
        let bytes = decode_base64(data)?;

        // UTF-8 unless the part says otherwise
        let text = self.charset().map_or_else(
            || String::from_utf8_lossy(&bytes).into_owned(),
            |charset| charset.decode(&bytes).0.into_owned(),
        );
        Ok(Some(text))
    }

    fn collect_text(&self, out: &mut TextParts) -> Result<()> {
        if !self.parts.is_empty() {
            for part in &self.parts {
                part.collect_text(out)?;
            }
            return Ok(());
        }

        if self.is_attachment() {
            return Ok(());
        }

        let mime = self.mime_type();
        if mime.starts_with("text/plain") {
            out.plain.extend(self.decoded_body()?);
        } else if mime.starts_with("text/html") {
            out.html.extend(self.decoded_body()?);
        }

        Ok(())
    }
}

impl MessageSource for MessagePart {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn text_parts(&self) -> Result<TextParts> {
        let mut parts = TextParts::default();
        self.collect_text(&mut parts)?;
        Ok(parts)
    }
}

/// Decode provider base64; padding and alphabet vary between endpoints
fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let data = data.trim();
    let engines: [&base64::engine::GeneralPurpose; 4] = [
        &BASE64_URL_SAFE_NO_PAD,
        &BASE64_URL_SAFE,
        &BASE64_STANDARD,
        &BASE64_STANDARD_NO_PAD,
    ];

    engines
        .iter()
        .find_map(|engine| engine.decode(data).ok())
        .ok_or_else(|| Error::Decode("invalid base64 body data".into()))
}
