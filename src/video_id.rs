/// Video id extraction from user input
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

static URL_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/(?:watch\?v=|embed/|v/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})").unwrap()
});

/// Whether `candidate` has the shape of a video id (11 of `[A-Za-z0-9_-]`)
pub fn is_valid_video_id(candidate: &str) -> bool {
    VIDEO_ID_RE.is_match(candidate)
}

/// Extract the video id from a bare id or a YouTube URL.
///
/// Accepts `watch?v=`, `embed/`, `v/`, `shorts/` and `youtu.be/` forms, with or without a
/// scheme. Returns `None` when no id can be found.
pub fn extract_video_id(url_or_id: &str) -> Option<String> {
    let input = url_or_id.trim();
    if input.is_empty() {
        return None;
    }

    if is_valid_video_id(input) {
        return Some(input.to_string());
    }

    // `v` may appear anywhere in the watch query
    if let Ok(url) = Url::parse(input) {
        if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
            if is_valid_video_id(&id) {
                return Some(id.into_owned());
            }
        }
    }

    URL_ID_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id() {
        assert_eq!(extract_video_id(" dQw4w9WgXcQ "), Some("dQw4w9WgXcQ".to_string()));
        assert!(is_valid_video_id("a_b-c123456"));
        assert!(!is_valid_video_id("too-short"));
    }

    #[test]
    fn test_url_forms() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        ];
        for url in urls {
            assert_eq!(extract_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{}", url);
        }
    }

    #[test]
    fn test_rejects_unrecognised_input() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://example.com/watch"), None);
        assert_eq!(extract_video_id("not a video"), None);
    }
}
