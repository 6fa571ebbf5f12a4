/// Locator for caption tracks embedded in a watch page's player configuration
///
/// The watch page assigns a JSON blob to `ytInitialPlayerResponse`. Caption tracks live at
/// `captions.playerCaptionsTracklistRenderer.captionTracks`. Two extraction paths exist:
/// a structured decode of the blob into `CaptionTrack`s, and a plain text search for the
/// first `baseUrl` that keeps working when the blob no longer decodes.
use super::{with_format_param, CaptionFormat, CaptionTrack};
use crate::error::ParseError;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

static PLAYER_RESPONSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ytInitialPlayerResponse\s*=\s*\{").unwrap());

static CAPTION_TRACKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"captionTracks"\s*:\s*\[(.*?)\]"#).unwrap());

static BASE_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""baseUrl"\s*:\s*"([^"]+)""#).unwrap());

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlayerResponse {
    captions: Option<Captions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<Tracklist>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Tracklist {
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: Option<String>,
    language_code: Option<String>,
    kind: Option<String>,
    name: Option<TrackName>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
}

/// Decode the caption tracks listed in a watch page.
///
/// A page without a player configuration, or a configuration without captions, yields no
/// tracks. A configuration blob that is present but does not decode is a `ParseError`.
pub fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, ParseError> {
    if page.trim().is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    let Some(blob) = extract_player_response(page) else {
        debug!("No ytInitialPlayerResponse found in page");
        return Ok(Vec::new());
    };

    let response: PlayerResponse = serde_json::from_str(blob)?;
    let tracks = response
        .captions
        .and_then(|captions| captions.tracklist)
        .map(|tracklist| tracklist.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| {
            let source_url = raw.base_url.filter(|url| !url.is_empty())?;
            Some(CaptionTrack {
                language_code: raw.language_code.unwrap_or_default(),
                is_auto_generated: raw.kind.is_some_and(|kind| kind == "asr"),
                source_url: unescape_url(&source_url),
                name: raw.name.and_then(|name| name.simple_text),
            })
        })
        .collect::<Vec<_>>();

    debug!("Player configuration lists {} caption tracks", tracks.len());
    Ok(tracks)
}

/// Find the first caption-track `baseUrl` in a page and make it fetchable in `format`.
///
/// This is a text search over the page; it does not need the configuration to decode.
pub fn locate_caption_url(page: &str, format: CaptionFormat) -> Option<String> {
    let tracks = CAPTION_TRACKS_RE.captures(page)?;
    let base_url = BASE_URL_RE.captures(tracks.get(1)?.as_str())?;
    let url = unescape_url(base_url.get(1)?.as_str());
    Some(with_format_param(&url, format))
}

/// Slice out the JSON object assigned to `ytInitialPlayerResponse`, matching braces
/// and skipping over string literals.
fn extract_player_response(page: &str) -> Option<&str> {
    let marker = PLAYER_RESPONSE_RE.find(page)?;
    let start = marker.end() - 1;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, byte) in page.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&page[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

fn unescape_url(url: &str) -> String {
    url.replace("\\u0026", "&").replace("\\/", "/").replace("&amp;", "&")
}
