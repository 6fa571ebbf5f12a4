use crate::captions::CaptionFormat;
use crate::strategies::StrategyKind;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Placeholder values shipped in sample configurations
const API_KEY_PLACEHOLDERS: &[&str] = &["YOUR_YOUTUBE_API_KEY_HERE"];

/// Configuration for the transcript engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Outbound HTTP settings
    pub http: HttpConfig,

    /// Caption acquisition settings
    pub captions: CaptionsConfig,

    /// Data API credentials
    pub api: ApiConfig,

    /// In-process transcript cache
    pub cache: CacheConfig,

    /// Logging and output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionsConfig {
    /// Language used when the caller does not ask for one
    pub default_language: String,

    /// Wire format requested by the timed-text strategy
    pub format: CaptionFormat,

    /// Strategies to try, in priority order
    pub strategies: Vec<StrategyKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// YouTube Data API key; only used to probe caption existence
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the transcript cache
    pub enabled: bool,

    /// How long a transcript stays cached, in seconds
    pub ttl_seconds: u64,

    /// Maximum number of cached transcripts
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            format: CaptionFormat::Json3,
            strategies: StrategyKind::all(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600, // 1 hour
            max_entries: 256,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// How usable a configured Data API key looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyStatus {
    NotSet,
    Placeholder,
    /// Set, but does not look like a Google API key (`AIza...`)
    UnexpectedFormat,
    Configured,
}

impl ApiKeyStatus {
    pub fn of(api_key: Option<&str>) -> Self {
        let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            return ApiKeyStatus::NotSet;
        };

        if API_KEY_PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(key)) {
            ApiKeyStatus::Placeholder
        } else if !key.starts_with("AIza") {
            ApiKeyStatus::UnexpectedFormat
        } else {
            ApiKeyStatus::Configured
        }
    }

    /// Whether requests should be attempted with this key
    pub fn allows_requests(self) -> bool {
        matches!(self, ApiKeyStatus::UnexpectedFormat | ApiKeyStatus::Configured)
    }
}

impl fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ApiKeyStatus::NotSet => "API key is not set",
            ApiKeyStatus::Placeholder => "API key is using default placeholder value",
            ApiKeyStatus::UnexpectedFormat => "API key format appears invalid (should start with 'AIza')",
            ApiKeyStatus::Configured => "API key appears to be configured correctly",
        };
        f.write_str(message)
    }
}

impl Config {
    /// Load configuration from the first config file found, else from the environment
    pub fn load() -> Result<Self> {
        let config_paths = [
            "youtube-tools.toml",
            "config/youtube-tools.toml",
            "/etc/youtube-tools/config.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::load_from_path(path) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&config_str)?;
        config.apply_env();
        Ok(config)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("YOUTUBE_TOOLS_API_KEY") {
            self.api.api_key = Some(api_key);
        }

        if let Ok(timeout) = std::env::var("YOUTUBE_TOOLS_TIMEOUT") {
            match timeout.parse() {
                Ok(seconds) => self.http.request_timeout_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid YOUTUBE_TOOLS_TIMEOUT: {}", timeout),
            }
        }

        if let Ok(language) = std::env::var("YOUTUBE_TOOLS_LANGUAGE") {
            self.captions.default_language = language;
        }

        if let Ok(log_level) = std::env::var("YOUTUBE_TOOLS_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        if let Ok(ttl) = std::env::var("YOUTUBE_TOOLS_CACHE_TTL") {
            match ttl.parse() {
                Ok(seconds) => self.cache.ttl_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid YOUTUBE_TOOLS_CACHE_TTL: {}", ttl),
            }
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        if self.captions.strategies.is_empty() {
            return Err(anyhow!("at least one caption strategy must be enabled"));
        }

        if self.captions.default_language.trim().is_empty() {
            return Err(anyhow!("default_language must not be empty"));
        }

        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(anyhow!("cache max_entries must be greater than 0 when caching is enabled"));
        }

        if self.captions.strategies.contains(&StrategyKind::DataApi) {
            let status = self.api_key_status();
            if status == ApiKeyStatus::UnexpectedFormat {
                tracing::warn!("{}", status);
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    pub fn api_key_status(&self) -> ApiKeyStatus {
        ApiKeyStatus::of(self.api.api_key.as_deref())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        let strategies: Vec<String> = self.captions.strategies.iter().map(|s| s.to_string()).collect();
        format!(
            "YouTube Tools Configuration:\n\
            - Request Timeout: {}s\n\
            - Default Language: {}\n\
            - Caption Format: {}\n\
            - Strategies: {}\n\
            - Data API: {}\n\
            - Caching Enabled: {} (ttl {}s, max {})",
            self.http.request_timeout_seconds,
            self.captions.default_language,
            self.captions.format,
            strategies.join(", "),
            self.api_key_status(),
            self.cache.enabled,
            self.cache.ttl_seconds,
            self.cache.max_entries
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.http.request_timeout_seconds = seconds;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.api.api_key = Some(api_key);
        self
    }

    pub fn with_default_language(mut self, language: &str) -> Self {
        self.config.captions.default_language = language.to_string();
        self
    }

    pub fn with_caption_format(mut self, format: CaptionFormat) -> Self {
        self.config.captions.format = format;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.config.captions.strategies = strategies;
        self
    }

    pub fn enable_caching(mut self, enable: bool) -> Self {
        self.config.cache.enabled = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.request_timeout_seconds, 10);
        assert_eq!(config.captions.strategies, StrategyKind::all());
        assert!(config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_timeout(3)
            .with_caption_format(CaptionFormat::Xml)
            .with_strategies(vec![StrategyKind::WatchPage])
            .enable_caching(false)
            .build();

        assert_eq!(config.http.request_timeout_seconds, 3);
        assert_eq!(config.captions.format, CaptionFormat::Xml);
        assert_eq!(config.captions.strategies, vec![StrategyKind::WatchPage]);
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_config_validation() {
        assert!(ConfigBuilder::new().with_timeout(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_strategies(vec![]).build().validate().is_err());
    }

    #[test]
    fn test_api_key_status() {
        assert_eq!(ApiKeyStatus::of(None), ApiKeyStatus::NotSet);
        assert_eq!(ApiKeyStatus::of(Some("  ")), ApiKeyStatus::NotSet);
        assert_eq!(ApiKeyStatus::of(Some("your_youtube_api_key_here")), ApiKeyStatus::Placeholder);
        assert_eq!(ApiKeyStatus::of(Some("abc123")), ApiKeyStatus::UnexpectedFormat);
        assert_eq!(ApiKeyStatus::of(Some("AIzaSyExample")), ApiKeyStatus::Configured);
        assert!(!ApiKeyStatus::Placeholder.allows_requests());
        assert!(ApiKeyStatus::UnexpectedFormat.allows_requests());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [captions]
            format = "xml"
            strategies = ["watch_page", "timed_text"]

            [cache]
            ttl_seconds = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.captions.format, CaptionFormat::Xml);
        assert_eq!(config.captions.strategies, vec![StrategyKind::WatchPage, StrategyKind::TimedText]);
        assert_eq!(config.captions.default_language, "en");
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.cache.max_entries, 256);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("youtube-tools.toml");

        let config = ConfigBuilder::new()
            .with_default_language("de")
            .with_timeout(7)
            .with_caption_format(CaptionFormat::Xml)
            .with_strategies(vec![StrategyKind::DataApi, StrategyKind::TimedText])
            .build();
        config.save(&path).unwrap();

        // Decode without environment overrides
        let saved: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.captions.default_language, "de");
        assert_eq!(saved.http.request_timeout_seconds, 7);
        assert_eq!(saved.api.api_key, None);

        // Fields with no environment override survive a full load
        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.captions.format, CaptionFormat::Xml);
        assert_eq!(loaded.captions.strategies, vec![StrategyKind::DataApi, StrategyKind::TimedText]);
        assert!(loaded.cache.enabled);
    }
}
