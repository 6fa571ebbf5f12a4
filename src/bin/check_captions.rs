use anyhow::{anyhow, Result};
use youtube_tools_rust::{extract_video_id, Config, StrategyKind, StrategyOutput, TranscriptService};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("youtube_tools_rust=info")
        .init();

    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .ok_or_else(|| anyhow!("usage: check-captions <URL_OR_ID> [LANGUAGE]"))?;
    let video_id = extract_video_id(&input).ok_or_else(|| anyhow!("Invalid YouTube URL or video ID: {}", input))?;

    let mut config = Config::load().unwrap_or_default();
    config.captions.strategies = StrategyKind::all();
    config.cache.enabled = false;
    let language = args.next().unwrap_or_else(|| config.captions.default_language.clone());

    info!("🔍 Checking caption availability for {} ({})...", video_id, language);
    info!("🔑 {}", config.api_key_status());

    let service = TranscriptService::new(&config)?;

    // Each strategy on its own, with its error surfaced
    for kind in service.strategy_kinds() {
        match service.run_strategy(kind, &video_id, &language).await {
            Ok(StrategyOutput::Found(transcript)) => {
                info!(
                    "✅ {}: {} entries in '{}' (available: {})",
                    kind,
                    transcript.len(),
                    transcript.language(),
                    transcript.available_languages().join(", ")
                );
            }
            Ok(StrategyOutput::Empty) => info!("➖ {}: no transcript", kind),
            Ok(StrategyOutput::CaptionsInaccessible { languages }) => {
                info!("🔒 {}: captions exist but cannot be downloaded ({})", kind, languages.join(", "));
            }
            Err(e) => info!("❌ {}: {}", kind, e),
        }
    }

    // The full cascade as callers see it
    let report = service.fetch_with_report(&video_id, &language).await;
    info!("📋 Fetch report:\n{}", serde_json::to_string_pretty(&report.attempts)?);
    match report.winning_strategy() {
        Some(kind) => info!("🎉 Transcript available via {} ({} words)", kind, report.transcript.word_count()),
        None => info!("💡 No downloadable transcript for this video"),
    }

    Ok(())
}
