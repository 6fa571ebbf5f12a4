/// Parser for the timed-text track listing (`/api/timedtext?type=list`)
///
/// ```xml
/// <transcript_list docid="...">
///   <track id="0" name="" lang_code="en" lang_original="English" lang_translated="English"/>
///   <track id="1" name="" lang_code="en" kind="asr" lang_original="English (auto-generated)"/>
/// </transcript_list>
/// ```
use super::CaptionTrack;
use crate::error::ParseError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Timed-text endpoint serving both listings and track content
pub const TIMEDTEXT_ENDPOINT: &str = "https://www.youtube.com/api/timedtext";

static LANG_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"lang_code="([^"]+)""#).unwrap());

/// URL of the track listing for a video
pub fn listing_url(video_id: &str) -> String {
    format!("{}?v={}&type=list", TIMEDTEXT_ENDPOINT, urlencoding::encode(video_id))
}

/// URL of one track's content, without a format parameter
pub fn track_url(video_id: &str, language_code: &str, auto_generated: bool, name: Option<&str>) -> String {
    let mut url = format!(
        "{}?v={}&lang={}",
        TIMEDTEXT_ENDPOINT,
        urlencoding::encode(video_id),
        urlencoding::encode(language_code)
    );
    if auto_generated {
        url.push_str("&kind=asr");
    }
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        url.push_str("&name=");
        url.push_str(&urlencoding::encode(name));
    }
    url
}

/// Parse a track listing into caption tracks for `video_id`
pub fn parse_track_listing(payload: &str, video_id: &str) -> Result<Vec<CaptionTrack>, ParseError> {
    if payload.trim().is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    let document = Html::parse_fragment(payload);
    let selector = Selector::parse("track")
        .map_err(|e| ParseError::Malformed(format!("invalid selector: {}", e)))?;

    let mut tracks = Vec::new();
    for element in document.select(&selector) {
        let attrs = element.value();
        let Some(language_code) = attrs.attr("lang_code").map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };
        let auto_generated = attrs.attr("kind").is_some_and(|kind| kind.eq_ignore_ascii_case("asr"));
        let name = attrs.attr("name").map(str::to_string).filter(|n| !n.is_empty());

        tracks.push(CaptionTrack {
            language_code: language_code.to_string(),
            is_auto_generated: auto_generated,
            source_url: track_url(video_id, language_code, auto_generated, name.as_deref()),
            name,
        });
    }

    if tracks.is_empty() {
        tracks = LANG_CODE_RE
            .captures_iter(payload)
            .map(|caps| {
                let code = &caps[1];
                CaptionTrack::new(code, false, track_url(video_id, code, false, None))
            })
            .collect();
        if !tracks.is_empty() {
            debug!("Recovered {} caption tracks from raw lang_code attributes", tracks.len());
        }
    }

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript_list docid="123">
        <track id="0" name="" lang_code="en" lang_original="English" lang_translated="English" lang_default="true"/>
        <track id="1" name="CC (Director)" lang_code="fr" lang_original="Français"/>
        <track id="2" name="" lang_code="de" kind="asr" lang_original="Deutsch"/>
    </transcript_list>"#;

    #[test]
    fn test_parse_listing() {
        let tracks = parse_track_listing(LISTING, "dQw4w9WgXcQ").unwrap();
        assert_eq!(tracks.len(), 3);

        assert_eq!(tracks[0].language_code, "en");
        assert!(!tracks[0].is_auto_generated);
        assert_eq!(
            tracks[0].source_url,
            "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en"
        );

        assert_eq!(tracks[1].name.as_deref(), Some("CC (Director)"));
        assert!(tracks[1].source_url.ends_with("&lang=fr&name=CC%20%28Director%29"));

        assert!(tracks[2].is_auto_generated);
        assert!(tracks[2].source_url.ends_with("&lang=de&kind=asr"));
    }

    #[test]
    fn test_empty_listing() {
        assert!(parse_track_listing("<transcript_list/>", "abc").unwrap().is_empty());
        assert!(matches!(parse_track_listing("", "abc"), Err(ParseError::EmptyPayload)));
    }

    #[test]
    fn test_regex_fallback() {
        let tracks = parse_track_listing(r#"lang_code="es" lang_code="it""#, "abc").unwrap();
        let codes: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
        assert_eq!(codes, vec!["es", "it"]);
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(listing_url("abc"), "https://www.youtube.com/api/timedtext?v=abc&type=list");
    }
}
