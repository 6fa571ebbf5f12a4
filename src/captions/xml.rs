/// Timed-XML caption parser for `<text start="1.5" dur="2.0">content</text>` documents
use crate::error::ParseError;
use crate::transcript::TranscriptEntry;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Duration used when an element has no usable `dur` attribute
pub const DEFAULT_ENTRY_DURATION: f64 = 5.0;

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);").unwrap());

/// Self-closing `<text .../>`; the HTML tokenizer would otherwise leave it open
static SELF_CLOSING_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<text\b([^>]*?)\s*/>").unwrap());

/// Parse a timed-XML payload into transcript entries
pub fn parse_timed_xml(payload: &str) -> Result<Vec<TranscriptEntry>, ParseError> {
    if payload.trim().is_empty() {
        return Err(ParseError::EmptyPayload);
    }
    if !payload.contains('<') {
        return Err(ParseError::Malformed("payload contains no markup".to_string()));
    }

    let payload = SELF_CLOSING_TEXT_RE.replace_all(payload, "<text$1></text>");
    let document = Html::parse_fragment(&payload);
    let selector = Selector::parse("text")
        .map_err(|e| ParseError::Malformed(format!("invalid selector: {}", e)))?;

    let mut entries = Vec::new();
    for element in document.select(&selector) {
        let attrs = element.value();

        let Some(start) = attrs.attr("start").and_then(parse_seconds) else {
            debug!("Skipping <text> element without a usable start attribute");
            continue;
        };
        let duration = attrs
            .attr("dur")
            .and_then(parse_seconds)
            .unwrap_or(DEFAULT_ENTRY_DURATION);

        let raw: String = element.text().collect();
        let text = clean_caption_text(&decode_entities(&raw));
        if text.is_empty() {
            continue;
        }

        entries.push(TranscriptEntry::new(start, duration, text));
    }

    debug!("Parsed {} entries from timed-XML", entries.len());
    Ok(entries)
}

fn parse_seconds(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

/// Decode entities left over after the document parser's own pass.
///
/// Caption XML is frequently escaped twice (`&amp;#39;`), so one pass leaves `&#39;` behind.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Collapse line breaks and whitespace runs into single spaces
pub fn clean_caption_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
