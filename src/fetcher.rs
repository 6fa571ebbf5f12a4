/// HTTP access used by the acquisition strategies
use crate::config::HttpConfig;
use crate::error::{Result, TranscriptError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([?&]key=)[^&]+").unwrap());

/// Plain-text GET access to the video platform
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch `url` and return the body as text.
    ///
    /// Non-success statuses are errors. `accept_language` sets the `Accept-Language` header.
    async fn get_text(&self, url: &str, accept_language: Option<&str>) -> Result<String>;
}

/// `HttpFetcher` backed by a shared reqwest client with a per-request timeout
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    /// Create a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_text(&self, url: &str, accept_language: Option<&str>) -> Result<String> {
        debug!("GET {}", redact_url(url));

        let mut request = self.client.get(url).timeout(self.timeout);
        if let Some(language) = accept_language {
            request = request.header(ACCEPT_LANGUAGE, language);
        }

        // reqwest errors print the request URL, which may carry the API key
        let response = request.send().await.map_err(|e| TranscriptError::Http(e.without_url()))?;
        if !response.status().is_success() {
            return Err(TranscriptError::HttpStatus {
                status: response.status().as_u16(),
                url: redact_url(url),
            });
        }

        response.text().await.map_err(|e| TranscriptError::Http(e.without_url()))
    }
}

/// Mask an API key query parameter so URLs can be logged
pub fn redact_url(url: &str) -> String {
    API_KEY_RE.replace_all(url, "${1}REDACTED").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("https://www.googleapis.com/youtube/v3/captions?videoId=a&key=AIzaSecret&part=snippet"),
            "https://www.googleapis.com/youtube/v3/captions?videoId=a&key=REDACTED&part=snippet"
        );
        assert_eq!(redact_url("https://x.test/?v=a"), "https://x.test/?v=a");
    }

    #[test]
    fn test_fetcher_uses_configured_timeout() {
        let config = Config::default();
        let fetcher = ReqwestFetcher::new(&config.http).unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_secs(config.http.request_timeout_seconds));
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let config = Config::default();
        let fetcher = ReqwestFetcher::new(&config.http).unwrap();

        let err = fetcher
            .get_text("http://127.0.0.1:1/youtube/v3/captions?videoId=a&part=snippet&key=AIzaSecretKey123", None)
            .await
            .unwrap_err();

        assert!(matches!(err, TranscriptError::Http(_)));
        assert!(!err.to_string().contains("AIzaSecretKey123"));
        assert!(!format!("{:?}", err).contains("AIzaSecretKey123"));
    }
}
