//! Jina reader extraction: `GET {base}/{target-url}` returns the page as text.

use super::{send_checked, ContentExtractor};
use crate::config::ExtractionSettings;
use crate::error::{Result, UpstreamError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument};

const SERVICE: &str = "jina";

/// Extracts page text through the Jina reader.
pub struct JinaReader {
    http: reqwest::Client,
    token: Option<SecretString>,
    base_url: String,
    timeout: Duration,
}

impl JinaReader {
    /// Create a reader client.
    ///
    /// # Arguments
    ///
    /// * `http` - The process-wide HTTP client
    /// * `token` - Optional bearer token; anonymous calls are rate limited
    /// * `settings` - Reader base URL and request timeout
    pub fn new(http: reqwest::Client, token: Option<SecretString>, settings: &ExtractionSettings) -> Self {
        Self {
            http,
            token,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// The reader takes the target URL verbatim as its path.
    fn reader_url(&self, url: &str) -> String {
        format!("{}/{}", self.base_url, url)
    }
}

#[async_trait]
impl ContentExtractor for JinaReader {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> Result<String> {
        let mut request = self.http.get(self.reader_url(url)).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        let resp = send_checked(SERVICE, request).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| UpstreamError::network(SERVICE, e))?;
        debug!(bytes = text.len(), "Extracted page text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::reader_stub;

    fn reader_at(base: String) -> JinaReader {
        let settings = ExtractionSettings {
            base_url: base,
            ..ExtractionSettings::default()
        };
        JinaReader::new(reqwest::Client::new(), None, &settings)
    }

    #[tokio::test]
    async fn test_extract_returns_body_text() {
        let reader = reader_at(reader_stub().await);
        let text = reader.extract("https://ok.example/a").await.unwrap();
        assert!(text.starts_with("body:"));
        assert!(text.ends_with("ok.example/a"));
    }

    #[tokio::test]
    async fn test_server_error_is_status_failure() {
        let reader = reader_at(reader_stub().await);
        let err = reader.extract("https://down.example/a").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { service: "jina", status: 503, .. }));
        assert_eq!(err.detail(), "reader overloaded");
    }

    #[test]
    fn test_reader_url_appends_target_verbatim() {
        let reader = JinaReader::new(reqwest::Client::new(), None, &ExtractionSettings::default());
        assert_eq!(
            reader.reader_url("https://g1.globo.com/politica/noticia.ghtml?x=1"),
            "https://r.jina.ai/https://g1.globo.com/politica/noticia.ghtml?x=1"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_is_ignored() {
        let settings = ExtractionSettings {
            base_url: "http://localhost:3000/".to_string(),
            ..ExtractionSettings::default()
        };
        let reader = JinaReader::new(reqwest::Client::new(), None, &settings);
        assert_eq!(reader.reader_url("https://a.example"), "http://localhost:3000/https://a.example");
    }
}
