//! Upstream service clients.
//!
//! Each collaborator is a single-request wrapper: send one request, await one
//! response, surface transport, status and decoding failures as
//! [`UpstreamError`]. Nothing here retries.
//!
//! | Concern | Trait | Client | Service |
//! |---------|-------|--------|---------|
//! | Text completion | [`TextCompletion`] | [`openai::OpenAiCompletion`] | OpenAI chat completions |
//! | Candidate search | [`SearchProvider`] | [`serpapi::SerpApiNews`] | SerpApi Google News |
//! | Content extraction | [`ContentExtractor`] | [`jina::JinaReader`] | Jina reader |
//! | Publishing | [`Publisher`] | [`wordpress::WordPressPublisher`] | WordPress REST posts |
//!
//! All clients share one `reqwest::Client` built in `main`.

use crate::error::{Result, UpstreamError};
use crate::models::{Candidate, PublishRequest, PublishedPost};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::warn;

pub mod jina;
pub mod openai;
pub mod serpapi;
pub mod wordpress;

#[cfg(test)]
pub(crate) mod stub;

#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Send a system instruction plus user content; returns the trimmed answer.
    async fn complete(&self, system_instruction: &str, user_content: &str) -> Result<String>;
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Candidates for `query`, in the provider's order.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>>;
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Plain text extracted from the page at `url`.
    async fn extract(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishedPost>;
}

/// Send a prepared request and turn transport or non-2xx failures into
/// [`UpstreamError`], keeping the status and raw body.
pub(crate) async fn send_checked(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    send_expecting(service, request, |status| status.is_success()).await
}

/// Like [`send_checked`], but only statuses accepted by `accepts` succeed.
///
/// # Arguments
///
/// * `service` - Upstream name recorded in errors and logs
/// * `request` - The prepared request
/// * `accepts` - Which response statuses count as success
///
/// # Returns
///
/// The response when its status is accepted, otherwise
/// [`UpstreamError::Status`] carrying the code and the raw body.
pub(crate) async fn send_expecting(
    service: &'static str,
    request: reqwest::RequestBuilder,
    accepts: fn(StatusCode) -> bool,
) -> Result<reqwest::Response> {
    let resp = request
        .send()
        .await
        .map_err(|e| UpstreamError::network(service, e))?;

    let status = resp.status();
    if !accepts(status) {
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(service, status = status.as_u16(), error = %e, "Failed to read error body");
                String::new()
            }
        };
        warn!(
            service,
            status = status.as_u16(),
            body = %truncate_for_log(&body, 300),
            "Upstream returned an error status"
        );
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Decode a JSON body into `T`, reporting decoding failures as malformed.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<T> {
    let body = resp
        .text()
        .await
        .map_err(|e| UpstreamError::network(service, e))?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(
            service,
            error = %e,
            body = %truncate_for_log(&body, 300),
            "Upstream body did not match the expected shape"
        );
        UpstreamError::malformed(service, e.to_string())
    })
}
