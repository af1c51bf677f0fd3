//! SerpApi Google News search.
//!
//! A missing `news_results` field means nothing matched. Every record that is
//! present must carry a `title` and a `link`; `source.name` is optional.

use super::{read_json, send_checked, SearchProvider};
use crate::config::SearchSettings;
use crate::error::Result;
use crate::models::Candidate;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

const SERVICE: &str = "serpapi";

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    news_results: Vec<NewsResult>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    title: String,
    link: String,
    #[serde(default)]
    source: Option<NewsSource>,
}

#[derive(Debug, Deserialize)]
struct NewsSource {
    name: Option<String>,
}

impl From<NewsResult> for Candidate {
    fn from(r: NewsResult) -> Self {
        Candidate {
            title: r.title,
            source_name: r.source.and_then(|s| s.name),
            link: r.link,
        }
    }
}

/// Candidate search over SerpApi's Google News engine.
pub struct SerpApiNews {
    http: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    engine: String,
    country: String,
    language: String,
    timeout: Duration,
}

impl SerpApiNews {
    /// Create a search client.
    ///
    /// # Arguments
    ///
    /// * `http` - The process-wide HTTP client
    /// * `api_key` - SerpApi key, sent as the `api_key` query parameter
    /// * `settings` - Base URL, engine, locale and request timeout
    pub fn new(http: reqwest::Client, api_key: SecretString, settings: &SearchSettings) -> Self {
        Self {
            http,
            api_key,
            endpoint: format!("{}/search.json", settings.base_url.trim_end_matches('/')),
            engine: settings.engine.clone(),
            country: settings.country.clone(),
            language: settings.language.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiNews {
    #[instrument(level = "info", skip_all, fields(%query))]
    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        let request = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("engine", self.engine.as_str()),
                ("q", query),
                ("gl", self.country.as_str()),
                ("hl", self.language.as_str()),
                ("api_key", self.api_key.expose_secret()),
            ])
            .timeout(self.timeout);
        let resp = send_checked(SERVICE, request).await?;
        let parsed: SerpResponse = read_json(SERVICE, resp).await?;

        let candidates: Vec<Candidate> = parsed.news_results.into_iter().map(Candidate::from).collect();
        info!(count = candidates.len(), "Search returned candidates");
        Ok(candidates)
    }
}
