/// Caption track selection for a requested language
use super::{language_prefix, CaptionTrack};
use tracing::debug;

/// Pick the best track for `requested_language`.
///
/// Order of preference:
/// 1. exact (case-insensitive) language match that is human-authored
/// 2. same language prefix (`en` for `en-GB`) that is human-authored
/// 3. exact match that is auto-generated
/// 4. prefix match that is auto-generated
/// 5. the first track
///
/// Returns `None` only for an empty track list.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], requested_language: &str) -> Option<&'a CaptionTrack> {
    let requested = requested_language.trim();

    let mut exact_auto: Option<&CaptionTrack> = None;
    for track in tracks {
        if track.language_code.eq_ignore_ascii_case(requested) {
            if !track.is_auto_generated {
                debug!("Selected exact caption track: {}", track.language_code);
                return Some(track);
            }
            exact_auto.get_or_insert(track);
        }
    }

    let requested_prefix = language_prefix(requested);
    let mut prefix_auto: Option<&CaptionTrack> = None;
    for track in tracks {
        if track.language_prefix().eq_ignore_ascii_case(requested_prefix) {
            if !track.is_auto_generated {
                debug!("Selected caption track by prefix: {} for {}", track.language_code, requested);
                return Some(track);
            }
            prefix_auto.get_or_insert(track);
        }
    }

    if let Some(track) = exact_auto.or(prefix_auto) {
        debug!("Selected auto-generated caption track: {}", track.language_code);
        return Some(track);
    }

    let first = tracks.first();
    if let Some(track) = first {
        debug!("No caption track matches {}, falling back to {}", requested, track.language_code);
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(code: &str, auto: bool) -> CaptionTrack {
        CaptionTrack::new(code, auto, format!("https://example.test/{}", code))
    }

    #[test]
    fn test_prefers_human_track_over_exact_auto() {
        let tracks = vec![track("en", true), track("en-US", false), track("fr", false)];
        let selected = select_track(&tracks, "en").unwrap();
        assert_eq!(selected.language_code, "en-US");
        assert!(!selected.is_auto_generated);
    }

    #[test]
    fn test_exact_non_auto_wins() {
        let tracks = vec![track("en", true), track("en", false)];
        let selected = select_track(&tracks, "en").unwrap();
        assert_eq!(selected.language_code, "en");
        assert!(!selected.is_auto_generated);
    }

    #[test]
    fn test_exact_auto_used_when_nothing_human_matches() {
        let tracks = vec![track("fr", false), track("en", true), track("en-GB", true)];
        let selected = select_track(&tracks, "en").unwrap();
        assert_eq!(selected.language_code, "en");
        assert!(selected.is_auto_generated);
    }

    #[test]
    fn test_prefix_match() {
        let tracks = vec![track("en", false)];
        assert_eq!(select_track(&tracks, "en-GB").unwrap().language_code, "en");
    }

    #[test]
    fn test_case_insensitive_exact_match() {
        let tracks = vec![track("pt", false), track("PT-br", false)];
        assert_eq!(select_track(&tracks, "pt-BR").unwrap().language_code, "PT-br");
    }

    #[test]
    fn test_falls_back_to_first_track() {
        let tracks = vec![track("de", true), track("fr", false)];
        assert_eq!(select_track(&tracks, "xx").unwrap().language_code, "de");
    }

    #[test]
    fn test_empty_list() {
        assert!(select_track(&[], "en").is_none());
    }
}
