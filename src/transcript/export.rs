use super::TranscriptEntry;
use crate::error::ParseError;
use std::fmt;
use std::time::Duration;

/// Subtitle formats a transcript can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip, `HH:MM:SS,mmm`
    Srt,
    /// WebVTT, `HH:MM:SS.mmm` with a `WEBVTT` header
    Vtt,
}

impl SubtitleFormat {
    fn millis_separator(self) -> char {
        match self {
            SubtitleFormat::Srt => ',',
            SubtitleFormat::Vtt => '.',
        }
    }

    fn header(self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "",
            SubtitleFormat::Vtt => "WEBVTT\n\n",
        }
    }
}

/// A single numbered subtitle cue
#[derive(Debug, Clone)]
pub struct SubtitleCue {
    /// Sequential number, starting at 1
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
    format: SubtitleFormat,
}

impl SubtitleCue {
    /// Build the cue for the `index`-th entry of a transcript
    pub fn from_entry(index: usize, entry: &TranscriptEntry, format: SubtitleFormat) -> Self {
        Self {
            index,
            start: seconds_to_duration(entry.start),
            end: seconds_to_duration(entry.end()),
            text: entry.text.clone(),
            format,
        }
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = self.format.millis_separator();
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.index,
            format_duration(self.start, separator),
            format_duration(self.end, separator),
            self.text
        )
    }
}

/// Render entries as a subtitle document; empty string when there are no entries
pub fn render_subtitles(entries: &[TranscriptEntry], format: SubtitleFormat) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut content = String::from(format.header());
    for (i, entry) in entries.iter().enumerate() {
        content.push_str(&SubtitleCue::from_entry(i + 1, entry, format).to_string());
        content.push('\n');
    }
    content
}

/// Format seconds as `HH:MM:SS`, dropping the hour field when it is zero
pub fn format_clock(seconds: f64) -> String {
    let total_seconds = seconds_to_duration(seconds).as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Format a duration as a subtitle timestamp with a fixed two-digit hour field
pub fn format_duration(duration: Duration, millis_separator: char) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, millis_separator, milliseconds
    )
}

/// Collect the `start --> end` timings of every cue in an SRT or VTT document
pub fn parse_cue_timings(content: &str) -> Vec<(Duration, Duration)> {
    content
        .lines()
        .filter(|line| line.contains(" --> "))
        .filter_map(|line| parse_timing_line(line).ok())
        .collect()
}

/// Parse a `HH:MM:SS,mmm --> HH:MM:SS,mmm` line (`.` is accepted for VTT)
pub fn parse_timing_line(line: &str) -> Result<(Duration, Duration), ParseError> {
    let parts: Vec<&str> = line.trim().split(" --> ").collect();
    if parts.len() != 2 {
        return Err(ParseError::Malformed(format!("invalid timing line: {}", line)));
    }

    Ok((parse_single_timestamp(parts[0])?, parse_single_timestamp(parts[1])?))
}

fn parse_single_timestamp(timestamp: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::Malformed(format!("invalid timestamp: {}", timestamp));

    let (clock, millis) = timestamp
        .trim()
        .split_once(|c: char| c == ',' || c == '.')
        .ok_or_else(invalid)?;

    let hms_parts: Vec<&str> = clock.split(':').collect();
    if hms_parts.len() != 3 {
        return Err(invalid());
    }

    let hours: u64 = hms_parts[0].parse().map_err(|_| invalid())?;
    let minutes: u64 = hms_parts[1].parse().map_err(|_| invalid())?;
    let seconds: u64 = hms_parts[2].parse().map_err(|_| invalid())?;
    let milliseconds: u64 = millis.parse().map_err(|_| invalid())?;

    let total_seconds = hours * 3600 + minutes * 60 + seconds;
    Ok(Duration::from_millis(total_seconds * 1000 + milliseconds))
}

fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or_default()
}
