/// Canonical timed-transcript model
///
/// Every acquisition path ends in a `Transcript`. Derived values (full text, plain text,
/// total duration, word count) are computed once in `Transcript::new` and never change.
pub mod export;

pub use export::{SubtitleCue, SubtitleFormat};

use serde::Serialize;

/// One captioned segment of a video
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TranscriptEntry {
    /// Offset from video start in seconds
    pub start: f64,
    /// Segment length in seconds
    pub duration: f64,
    /// Caption text, never empty after trimming
    pub text: String,
}

impl TranscriptEntry {
    /// Create a new entry
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    /// End offset in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Start offset as `HH:MM:SS`, or `MM:SS` under an hour
    pub fn formatted_time(&self) -> String {
        export::format_clock(self.start)
    }

    fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Transcript for one (video id, language) request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    video_id: String,
    language: String,
    available_languages: Vec<String>,
    entries: Vec<TranscriptEntry>,
    full_text: String,
    plain_text: String,
    total_duration: f64,
    word_count: usize,
}

impl Transcript {
    /// Build a transcript and compute its derived values.
    ///
    /// Entries are stable-sorted by start time so range and search queries can rely
    /// on ordering even when a source emits segments out of order.
    pub fn new(
        video_id: impl Into<String>,
        language: impl Into<String>,
        available_languages: Vec<String>,
        mut entries: Vec<TranscriptEntry>,
    ) -> Self {
        entries.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

        let mut languages: Vec<String> = Vec::with_capacity(available_languages.len());
        for language in available_languages {
            if !languages.contains(&language) {
                languages.push(language);
            }
        }

        let full_text = entries
            .iter()
            .map(|entry| format!("[{}] {}", entry.formatted_time(), entry.text))
            .collect::<Vec<_>>()
            .join("\n");

        let plain_text = entries
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let total_duration = entries.last().map(TranscriptEntry::end).unwrap_or(0.0);
        let word_count = entries.iter().map(TranscriptEntry::word_count).sum();

        Self {
            video_id: video_id.into(),
            language: language.into(),
            available_languages: languages,
            entries,
            full_text,
            plain_text,
            total_duration,
            word_count,
        }
    }

    /// The explicit "no transcript" result
    pub fn empty(video_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self::new(video_id, language, Vec::new(), Vec::new())
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Language actually served, which may differ from the one requested
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn available_languages(&self) -> &[String] {
        &self.available_languages
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Timestamp-prefixed lines, e.g. `[01:05] hello`
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Entry texts joined by single spaces
    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    /// End of the last entry in seconds, 0 when empty
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Case-insensitive substring search over entry text
    pub fn search_text(&self, query: &str) -> Vec<&TranscriptEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| entry.text.to_lowercase().contains(&needle))
            .collect()
    }

    /// Entries whose start falls within `[start_time, end_time]`
    pub fn entries_in_range(&self, start_time: f64, end_time: f64) -> Vec<&TranscriptEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.start >= start_time && entry.start <= end_time)
            .collect()
    }

    /// Render as SubRip subtitles
    pub fn to_srt(&self) -> String {
        export::render_subtitles(&self.entries, SubtitleFormat::Srt)
    }

    /// Render as WebVTT subtitles
    pub fn to_vtt(&self) -> String {
        export::render_subtitles(&self.entries, SubtitleFormat::Vtt)
    }

    /// Check data integrity: a video id, at least one entry, and sane entries
    pub fn is_valid(&self) -> bool {
        !self.video_id.trim().is_empty()
            && !self.entries.is_empty()
            && self.entries.iter().all(|entry| {
                !entry.text.trim().is_empty() && entry.start >= 0.0 && entry.duration >= 0.0
            })
    }

    pub fn summary(&self) -> TranscriptSummary {
        TranscriptSummary {
            video_id: self.video_id.clone(),
            language: self.language.clone(),
            total_duration: self.total_duration,
            word_count: self.word_count,
            entry_count: self.entries.len(),
            has_transcript: !self.entries.is_empty(),
        }
    }
}

/// Compact description of a transcript for listings and status output
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    pub video_id: String,
    pub language: String,
    pub total_duration: f64,
    pub word_count: usize,
    pub entry_count: usize,
    pub has_transcript: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn sample() -> Transcript {
        Transcript::new(
            "dQw4w9WgXcQ",
            "en",
            vec!["en".to_string(), "fr".to_string(), "en".to_string()],
            vec![
                TranscriptEntry::new(0.0, 5.0, "hello world"),
                TranscriptEntry::new(5.0, 3.0, "foo"),
                TranscriptEntry::new(3725.5, 2.0, "Never gonna give you up"),
            ],
        )
    }

    #[test]
    fn test_word_count() {
        let transcript = Transcript::new(
            "abc",
            "en",
            Vec::new(),
            vec![
                TranscriptEntry::new(0.0, 1.0, "hello world"),
                TranscriptEntry::new(1.0, 1.0, "foo"),
            ],
        );
        assert_eq!(transcript.word_count(), 3);
    }

    #[test]
    fn test_total_duration() {
        let transcript = Transcript::new(
            "abc",
            "en",
            Vec::new(),
            vec![
                TranscriptEntry::new(0.0, 5.0, "a"),
                TranscriptEntry::new(5.0, 3.0, "b"),
            ],
        );
        assert_eq!(transcript.total_duration(), 8.0);
        assert_eq!(Transcript::empty("abc", "en").total_duration(), 0.0);
    }

    #[test]
    fn test_full_text_omits_zero_hours() {
        let transcript = sample();
        let lines: Vec<&str> = transcript.full_text().lines().collect();
        assert_eq!(lines[0], "[00:00] hello world");
        assert_eq!(lines[1], "[00:05] foo");
        assert_eq!(lines[2], "[01:02:05] Never gonna give you up");
        assert!(!transcript.full_text().ends_with('\n'));
    }

    #[test]
    fn test_plain_text_has_no_timestamps() {
        let transcript = sample();
        assert_eq!(transcript.plain_text(), "hello world foo Never gonna give you up");

        let timestamp = Regex::new(r"\[\d").unwrap();
        assert!(!timestamp.is_match(transcript.plain_text()));
        assert!(timestamp.is_match(transcript.full_text()));
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::empty("dQw4w9WgXcQ", "xx");
        assert!(transcript.is_empty());
        assert_eq!(transcript.full_text(), "");
        assert_eq!(transcript.plain_text(), "");
        assert_eq!(transcript.word_count(), 0);
        assert_eq!(transcript.to_srt(), "");
        assert_eq!(transcript.to_vtt(), "");
        assert!(!transcript.is_valid());
        assert!(transcript.available_languages().is_empty());
    }

    #[test]
    fn test_available_languages_deduplicated() {
        assert_eq!(sample().available_languages(), &["en".to_string(), "fr".to_string()]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let transcript = sample();
        let hits = transcript.search_text("NEVER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "Never gonna give you up");

        assert!(transcript.search_text("").is_empty());
        assert!(transcript.search_text("   ").is_empty());
        assert!(Transcript::empty("a", "en").search_text("foo").is_empty());
    }

    #[test]
    fn test_entries_in_range_inclusive() {
        let transcript = sample();
        let hits = transcript.entries_in_range(0.0, 5.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].text, "foo");

        assert!(transcript.entries_in_range(10.0, 20.0).is_empty());
        assert!(transcript.entries_in_range(5.0, 0.0).is_empty());
    }

    #[test]
    fn test_out_of_order_entries_are_sorted() {
        let transcript = Transcript::new(
            "abc",
            "en",
            Vec::new(),
            vec![
                TranscriptEntry::new(10.0, 1.0, "second"),
                TranscriptEntry::new(2.0, 1.0, "first"),
            ],
        );
        assert_eq!(transcript.entries()[0].text, "first");
        assert_eq!(transcript.total_duration(), 11.0);
    }

    #[test]
    fn test_validity() {
        assert!(sample().is_valid());

        let blank_id = Transcript::new("  ", "en", Vec::new(), vec![TranscriptEntry::new(0.0, 1.0, "x")]);
        assert!(!blank_id.is_valid());

        let negative = Transcript::new("abc", "en", Vec::new(), vec![TranscriptEntry::new(0.0, -1.0, "x")]);
        assert!(!negative.is_valid());
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.word_count, 8);
        assert!(summary.has_transcript);
        assert_eq!(summary.total_duration, 3727.5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["videoId"], "dQw4w9WgXcQ");
        assert_eq!(json["wordCount"], 8);
        assert_eq!(json["entries"][1]["text"], "foo");
    }
}
