//! WordPress REST publisher.
//!
//! Posts `{title, content, status}` to the configured posts endpoint. Only
//! 200 and 201 count as success; any other status is returned verbatim as
//! [`UpstreamError::Status`] so callers can relay it.

use super::{read_json, send_expecting, Publisher};
use crate::config::PublishSettings;
use crate::error::{Result, UpstreamError};
use crate::models::{PublishRequest, PublishedPost};
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

const SERVICE: &str = "wordpress";

#[derive(Debug, Deserialize)]
struct PostResponse {
    link: Option<String>,
}

fn is_published(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED)
}

/// Publishes posts through the WordPress REST API.
pub struct WordPressPublisher {
    http: reqwest::Client,
    authorization: SecretString,
    posts_url: String,
    timeout: Duration,
}

impl WordPressPublisher {
    /// Create a publisher for one posts endpoint.
    ///
    /// # Arguments
    ///
    /// * `http` - The process-wide HTTP client
    /// * `authorization` - Full `Authorization` header value (e.g. `Basic ...`)
    /// * `posts_url` - The `wp/v2/posts` endpoint
    /// * `settings` - Request timeout
    pub fn new(
        http: reqwest::Client,
        authorization: SecretString,
        posts_url: String,
        settings: &PublishSettings,
    ) -> Self {
        Self {
            http,
            authorization,
            posts_url,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl Publisher for WordPressPublisher {
    #[instrument(level = "info", skip_all, fields(title = %request.title, status = ?request.status))]
    async fn publish(&self, request: &PublishRequest) -> Result<PublishedPost> {
        let call = self
            .http
            .post(&self.posts_url)
            .header(reqwest::header::AUTHORIZATION, self.authorization.expose_secret())
            .timeout(self.timeout)
            .json(request);
        let resp = send_expecting(SERVICE, call, is_published).await?;

        let post: PostResponse = read_json(SERVICE, resp).await?;
        let link = post
            .link
            .ok_or_else(|| UpstreamError::malformed(SERVICE, "published post has no link"))?;
        info!(%link, "Post published");
        Ok(PublishedPost { link })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;
    use crate::providers::stub::{self, Hits};
    use axum::{Json, Router, http::StatusCode as AxumStatus, routing::post};

    /// Stub posts endpoint answering every request with `status` and `body`.
    async fn posts_endpoint(status: u16, body: &'static str) -> (WordPressPublisher, Hits) {
        let hits = Hits::default();
        let counter = hits.clone();
        let router = Router::new().route(
            "/wp-json/wp/v2/posts",
            post(move |Json(payload): Json<serde_json::Value>| {
                let counter = counter.clone();
                async move {
                    counter.record();
                    let status = if payload["title"] == "Eleições" { status } else { 400 };
                    (AxumStatus::from_u16(status).unwrap(), body)
                }
            }),
        );
        let base = stub::serve(router).await;
        let publisher = WordPressPublisher::new(
            reqwest::Client::new(),
            SecretString::from("Basic dGVzdDp0ZXN0".to_string()),
            format!("{base}/wp-json/wp/v2/posts"),
            &PublishSettings::default(),
        );
        (publisher, hits)
    }

    fn article() -> PublishRequest {
        PublishRequest {
            title: "Eleições".to_string(),
            content: "<p>texto</p>".to_string(),
            status: PostStatus::Publish,
        }
    }

    #[tokio::test]
    async fn test_created_post_returns_link() {
        let (publisher, hits) =
            posts_endpoint(201, r#"{"id": 9, "link": "https://blog.example/eleicoes/"}"#).await;
        let post = publisher.publish(&article()).await.unwrap();
        assert_eq!(post.link, "https://blog.example/eleicoes/");
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn test_ok_post_returns_link() {
        let (publisher, _) = posts_endpoint(200, r#"{"link": "https://blog.example/a/"}"#).await;
        assert_eq!(publisher.publish(&article()).await.unwrap().link, "https://blog.example/a/");
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_raw_body_without_retry() {
        let (publisher, hits) = posts_endpoint(422, r#"{"code":"rest_invalid_param"}"#).await;
        let err = publisher.publish(&article()).await.unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.detail(), r#"{"code":"rest_invalid_param"}"#);
        assert_eq!(hits.count(), 1);
    }

    #[tokio::test]
    async fn test_accepted_is_not_published() {
        let (publisher, _) = posts_endpoint(202, r#"{"link": "https://blog.example/q/"}"#).await;
        let err = publisher.publish(&article()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 202, .. }));
    }

    #[tokio::test]
    async fn test_created_without_link_is_malformed() {
        let (publisher, _) = posts_endpoint(201, r#"{"id": 9}"#).await;
        let err = publisher.publish(&article()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { service: "wordpress", .. }));
    }

    #[test]
    fn test_only_200_and_201_count_as_published() {
        assert!(is_published(StatusCode::OK));
        assert!(is_published(StatusCode::CREATED));
        assert!(!is_published(StatusCode::ACCEPTED));
        assert!(!is_published(StatusCode::NO_CONTENT));
        assert!(!is_published(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_payload_shape() {
        let req = PublishRequest {
            title: "Eleições".to_string(),
            content: "<p>texto</p>".to_string(),
            status: PostStatus::Draft,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["title"], "Eleições");
        assert_eq!(json["content"], "<p>texto</p>");
        assert_eq!(json["status"], "draft");
    }

    #[test]
    fn test_post_response_link() {
        let post: PostResponse =
            serde_json::from_str(r#"{"id": 7, "link": "https://blog.example/eleicoes/"}"#).unwrap();
        assert_eq!(post.link.as_deref(), Some("https://blog.example/eleicoes/"));

        let post: PostResponse = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert!(post.link.is_none());
    }
}
