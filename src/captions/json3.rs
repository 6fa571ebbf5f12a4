/// Timed-JSON (`fmt=json3`) caption parser
///
/// Shape: `{"events":[{"tStartMs":1000,"dDurationMs":2000,"segs":[{"utf8":"Hi"}]}]}`.
/// Navigation goes through `serde_json::Value` so missing or oddly typed fields read as absent.
use crate::error::ParseError;
use crate::transcript::TranscriptEntry;
use serde_json::Value;
use tracing::debug;

/// Parse a timed-JSON payload into transcript entries
pub fn parse_json3(payload: &str) -> Result<Vec<TranscriptEntry>, ParseError> {
    if payload.trim().is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    let root: Value = serde_json::from_str(payload)?;
    let Some(events) = root.get("events").and_then(Value::as_array) else {
        debug!("Timed-JSON payload has no events array");
        return Ok(Vec::new());
    };

    let entries: Vec<TranscriptEntry> = events.iter().filter_map(parse_event).collect();

    debug!("Parsed {} entries from {} timed-JSON events", entries.len(), events.len());
    Ok(entries)
}

fn parse_event(event: &Value) -> Option<TranscriptEntry> {
    let segs = event.get("segs").and_then(Value::as_array)?;
    if segs.is_empty() {
        return None;
    }

    let text: String = segs
        .iter()
        .filter_map(|seg| seg.get("utf8").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let start_ms = millis(event, "tStartMs");
    let duration_ms = millis(event, "dDurationMs");

    Some(TranscriptEntry::new(start_ms / 1000.0, duration_ms / 1000.0, text))
}

fn millis(event: &Value, field: &str) -> f64 {
    event
        .get(field)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
        .max(0.0)
}
