use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use youtube_tools_rust::{extract_video_id, Config, Transcript, TranscriptEntry, TranscriptService};

const FORMATS: [&str; 6] = ["text", "plain", "srt", "vtt", "json", "summary"];

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("YouTube Tools (Rust)")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Fetch and export YouTube video transcripts")
        .arg(
            Arg::new("video")
                .value_name("URL_OR_ID")
                .help("YouTube video URL or 11-character video id")
                .required(true)
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("CODE")
                .help("Preferred caption language (defaults to the configured language)")
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(FORMATS)
                .default_value("text")
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("QUERY")
                .help("Only print entries containing this text")
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("SECONDS")
                .help("Only print entries starting at or after this offset")
                .value_parser(clap::value_parser!(f64))
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("SECONDS")
                .help("Only print entries starting at or before this offset")
                .value_parser(clap::value_parser!(f64))
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-request timeout")
                .value_parser(clap::value_parser!(u64))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_default(),
    };
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.http.request_timeout_seconds = *timeout;
    }

    let verbose = matches.get_flag("verbose");
    init_logging(&config, verbose);
    if verbose {
        info!("Verbose logging enabled");
    }
    config.validate()?;

    let input = matches
        .get_one::<String>("video")
        .ok_or_else(|| anyhow!("a video URL or id is required"))?;
    let video_id = extract_video_id(input).ok_or_else(|| anyhow!("Invalid YouTube URL or video ID: {}", input))?;
    let language = matches
        .get_one::<String>("language")
        .cloned()
        .unwrap_or_else(|| config.captions.default_language.clone());

    info!("🎬 Fetching transcript for {} ({})", video_id, language);

    let service = TranscriptService::new(&config)?;
    let transcript = service.fetch_transcript(&video_id, &language).await;

    if transcript.is_empty() {
        warn!("No transcript available for this video");
        println!("No transcript available for video {} in language '{}'", video_id, language);
        return Ok(());
    }

    let search = matches.get_one::<String>("search");
    let from = matches.get_one::<f64>("from").copied();
    let to = matches.get_one::<f64>("to").copied();

    if search.is_some() || from.is_some() || to.is_some() {
        let selected = select_entries(&transcript, search.map(String::as_str), from, to);

        info!("🔎 {} matching entries", selected.len());
        for entry in selected {
            println!("[{}] {}", entry.formatted_time(), entry.text);
        }
        return Ok(());
    }

    let format = matches.get_one::<String>("format").map(String::as_str).unwrap_or("text");
    println!("{}", render(&transcript, format)?);

    Ok(())
}

/// Entries within the inclusive `[from, to]` window, narrowed by `search` when given
fn select_entries<'a>(
    transcript: &'a Transcript,
    search: Option<&str>,
    from: Option<f64>,
    to: Option<f64>,
) -> Vec<&'a TranscriptEntry> {
    let mut selected = transcript.entries_in_range(from.unwrap_or(0.0), to.unwrap_or(f64::INFINITY));
    if let Some(query) = search {
        let hits = transcript.search_text(query);
        selected.retain(|entry| hits.iter().any(|hit| std::ptr::eq(*hit, *entry)));
    }
    selected
}

fn init_logging(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("youtube_tools_rust=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("youtube_tools_rust={}", config.output.log_level)))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(transcript: &Transcript, format: &str) -> Result<String> {
    let rendered = match format {
        "plain" => transcript.plain_text().to_string(),
        "srt" => transcript.to_srt(),
        "vtt" => transcript.to_vtt(),
        "json" => serde_json::to_string_pretty(transcript)?,
        "summary" => {
            let summary = transcript.summary();
            format!(
                "Video: {}\nLanguage: {}\nAvailable languages: {}\nEntries: {}\nWords: {}\nDuration: {:.1}s",
                summary.video_id,
                summary.language,
                transcript.available_languages().join(", "),
                summary.entry_count,
                summary.word_count,
                summary.total_duration
            )
        }
        _ => transcript.full_text().to_string(),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Transcript {
        Transcript::new(
            "dQw4w9WgXcQ",
            "en",
            vec!["en".to_string()],
            vec![
                TranscriptEntry::new(0.0, 2.0, "never gonna give"),
                TranscriptEntry::new(2.0, 2.0, "you up"),
                TranscriptEntry::new(4.0, 2.0, "never gonna let"),
                TranscriptEntry::new(6.0, 2.0, "you down"),
            ],
        )
    }

    #[test]
    fn test_range_is_inclusive() {
        let transcript = transcript();
        let selected = select_entries(&transcript, None, Some(2.0), Some(4.0));
        let texts: Vec<&str> = selected.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["you up", "never gonna let"]);
    }

    #[test]
    fn test_search_within_range() {
        let transcript = transcript();
        let selected = select_entries(&transcript, Some("NEVER"), Some(1.0), None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].start, 4.0);

        assert_eq!(select_entries(&transcript, Some("you"), None, None).len(), 2);
    }
}
