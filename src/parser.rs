//! RFC 5322 document parsing and the per-message normalization rules

use crate::error::{Error, RequiredField, Result};
use crate::types::{EmailAddress, MessageId, NormalizedMessage};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use mailparse::{DispositionType, MailAddr, MailHeaderMap, ParsedMail};
use std::collections::BTreeSet;
use tracing::debug;

/// Zone-less layouts accepted after the weekday has been stripped
const NAIVE_DATE_FORMATS: [&str; 2] = ["%d %b %Y %H:%M:%S", "%d %b %Y %H:%M"];

/// Header and body access shared by every raw message shape
pub(crate) trait MessageSource {
    /// First non-empty value of a header, looked up case-insensitively
    fn header(&self, name: &str) -> Option<String>;

    /// Text-bearing leaf parts in source order
    fn text_parts(&self) -> Result<TextParts>;
}

/// Decoded text parts of one message
#[derive(Debug, Default)]
pub(crate) struct TextParts {
    pub plain: Vec<String>,
    pub html: Vec<String>,
}

impl TextParts {
    /// Plain parts joined in order, or the stripped HTML when there are none
    pub fn into_body(self) -> String {
        let parts: Vec<String> = if self.plain.is_empty() {
            self.html.iter().map(|h| strip_html(h)).collect()
        } else {
            self.plain
                .into_iter()
                .map(|p| p.trim_end().to_string())
                .collect()
        };

        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse one raw RFC 5322 document into a normalized message.
///
/// `index` is the entry's position in its source and only feeds the
/// synthetic id and error messages.
pub fn parse_message(index: usize, raw: &[u8]) -> Result<NormalizedMessage> {
    parse_document(index, raw, None)
}

pub(crate) fn parse_document(
    index: usize,
    raw: &[u8],
    id: Option<MessageId>,
) -> Result<NormalizedMessage> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| {
        let entry = id
            .as_ref()
            .map_or_else(|| format!("#{index}"), |id| format!("#{index} {id}"));
        Error::Structure(e.to_string()).in_entry(entry)
    })?;

    let id = id
        .or_else(|| parsed.header("Message-ID").map(MessageId::new))
        .unwrap_or_else(|| MessageId::synthetic(index));

    build_message(&parsed, id, index)
}

/// Apply the normalization rules to any message source
pub(crate) fn build_message(
    source: &impl MessageSource,
    id: MessageId,
    index: usize,
) -> Result<NormalizedMessage> {
    let entry = format!("#{index} {id}");

    let from = source
        .header("From")
        .ok_or_else(|| Error::missing(&entry, RequiredField::Sender))?;
    let sender = parse_address_list(&from)
        .into_iter()
        .next()
        .ok_or_else(|| Error::invalid(&entry, RequiredField::Sender, &from))?;

    let date = source
        .header("Date")
        .ok_or_else(|| Error::missing(&entry, RequiredField::Timestamp))?;
    let timestamp =
        parse_timestamp(&date).ok_or_else(|| Error::invalid(&entry, RequiredField::Timestamp, &date))?;

    let recipients: BTreeSet<String> = ["To", "Cc"]
        .iter()
        .filter_map(|name| source.header(name))
        .flat_map(|value| parse_address_list(&value))
        .map(|addr| addr.normalized())
        .collect();

    let subject = source.header("Subject");
    let body = source.text_parts().map_err(|e| e.in_entry(&entry))?.into_body();

    debug!("Normalized message {} from {} at {}", id, sender.address, timestamp);

    Ok(NormalizedMessage {
        id,
        sender,
        recipients,
        timestamp,
        subject,
        body,
    })
}

impl MessageSource for ParsedMail<'_> {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get_first_value(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn text_parts(&self) -> Result<TextParts> {
        let mut parts = TextParts::default();
        collect_text_parts(self, &mut parts)?;
        Ok(parts)
    }
}

fn collect_text_parts(part: &ParsedMail, out: &mut TextParts) -> Result<()> {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_text_parts(sub, out)?;
        }
        return Ok(());
    }

    if part.get_content_disposition().disposition == DispositionType::Attachment {
        return Ok(());
    }

    let mimetype = part.ctype.mimetype.to_lowercase();
    if mimetype == "text/plain" {
        out.plain
            .push(part.get_body().map_err(|e| Error::Decode(e.to_string()))?);
    } else if mimetype == "text/html" {
        out.html
            .push(part.get_body().map_err(|e| Error::Decode(e.to_string()))?);
    }

    Ok(())
}

/// Parse an address-list header value, keeping only entries with an `@`
pub(crate) fn parse_address_list(value: &str) -> Vec<EmailAddress> {
    let Ok(list) = mailparse::addrparse(value) else {
        return value.split(',').filter_map(EmailAddress::parse).collect();
    };

    list.iter()
        .flat_map(|addr| match addr {
            MailAddr::Single(info) => vec![EmailAddress::new(
                info.addr.clone(),
                info.display_name.clone(),
            )],
            MailAddr::Group(group) => group
                .addrs
                .iter()
                .map(|info| EmailAddress::new(info.addr.clone(), info.display_name.clone()))
                .collect(),
        })
        .filter(|addr| addr.address.contains('@'))
        .collect()
}

/// Parse a Date header value.
///
/// The offset is preserved; a date without a zone is read as UTC.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    // Trailing comments such as "(PDT)" and the weekday are not needed, and a
    // wrong weekday would otherwise reject the whole date.
    let value = value.split_once('(').map_or(value, |(head, _)| head).trim();
    let value = value.split_once(',').map_or(value, |(_, tail)| tail).trim();

    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt);
    }

    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Reduce an HTML body to readable text
pub(crate) fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;
    let mut skipping: Option<&'static str> = None;

    for c in html.chars() {
        match (in_tag, c) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                let closing = tag.starts_with('/');

                match (closing, name.as_str()) {
                    (false, "script") => skipping = Some("script"),
                    (false, "style") => skipping = Some("style"),
                    (true, n) if skipping.is_some_and(|s| s == n) => skipping = None,
                    (_, "br" | "p" | "div" | "li" | "tr" | "h1" | "h2" | "h3" | "h4") => {
                        text.push('\n');
                    }
                    _ => {}
                }
            }
            (true, _) => tag.push(c),
            (false, _) if skipping.is_none() => text.push(c),
            (false, _) => {}
        }
    }

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_keeps_offset() {
        let dt = parse_timestamp("Wed, 1 Jan 2025 10:00:00 -0800").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -8 * 3600);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_ignores_comment_and_weekday() {
        let dt = parse_timestamp("Mon, 1 Jan 2025 10:00:00 -0700 (MST)").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_parse_timestamp_without_zone_is_utc() {
        let dt = parse_timestamp("Wed, 01 Jan 2025 12:30:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("tomorrow").is_none());
        assert!(parse_timestamp("Wed, sometime soon").is_none());
    }

    #[test]
    fn test_parse_address_list_with_names() {
        let addrs = parse_address_list("\"Doe, John\" <john@example.com>, jane@example.org");
        assert_eq!(addrs.len(), 2);
        assert_eq!(addrs[0].address, "john@example.com");
        assert_eq!(addrs[0].name.as_deref(), Some("Doe, John"));
        assert_eq!(addrs[1].address, "jane@example.org");
    }

    #[test]
    fn test_strip_html() {
        let text = strip_html(
            "<html><style>p { color: red; }</style><body><h1>Hello</h1>\
             <p>World &amp; friends</p><script>alert(1)</script></body></html>",
        );
        assert_eq!(text, "Hello\nWorld & friends");
    }

    #[test]
    fn test_into_body_prefers_plain() {
        let parts = TextParts {
            plain: vec!["first\n".into(), "second".into()],
            html: vec!["<p>ignored</p>".into()],
        };
        assert_eq!(parts.into_body(), "first\nsecond");
    }
}
