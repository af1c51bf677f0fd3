//! HTTP surface for the three stages.
//!
//! | Method | Path | Stage |
//! |--------|------|-------|
//! | GET | `/` | liveness with version and start time |
//! | GET | `/health` | plain `ok` |
//! | POST | `/search` | [`Ranker::rank`] |
//! | POST | `/extract` | [`Aggregator::extract_all`] (always 200) |
//! | POST | `/publish` | [`Publisher::publish`] |
//!
//! Ranking failures answer 500 with the upstream detail. A publish rejected by
//! the CMS answers with the CMS's own status code and raw body.

use crate::aggregate::Aggregator;
use crate::error::UpstreamError;
use crate::models::{AggregatedDocument, PublishRequest, RankedSelection};
use crate::providers::Publisher;
use crate::ranking::Ranker;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub ranker: Arc<Ranker>,
    pub aggregator: Arc<Aggregator>,
    pub publisher: Arc<dyn Publisher>,
    pub started_at: DateTime<Utc>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/search", post(search))
        .route("/extract", post(extract))
        .route("/publish", post(publish))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ExtractBody {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: &'static str,
    pub link: String,
}

#[derive(Debug, Serialize)]
struct Home {
    status: &'static str,
    version: &'static str,
    started_at: DateTime<Utc>,
}

/// Error body: `{"detail": "..."}` with the chosen status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// Any upstream failure during ranking is a server error.
    fn from_ranking(err: UpstreamError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: err.to_string(),
        }
    }

    /// Relay the CMS's status and body; transport or decoding trouble is a 502.
    fn from_publish(err: UpstreamError) -> Self {
        let status = err
            .status()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        Self {
            status,
            detail: err.detail(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

async fn home(State(state): State<AppState>) -> Json<Home> {
    Json(Home {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at,
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<RankedSelection>, ApiError> {
    state.ranker.rank(&body.prompt).await.map(Json).map_err(|e| {
        error!(error = %e, "Search and rank failed");
        ApiError::from_ranking(e)
    })
}

async fn extract(
    State(state): State<AppState>,
    Json(body): Json<ExtractBody>,
) -> Json<AggregatedDocument> {
    Json(state.aggregator.extract_all(&body.urls).await)
}

async fn publish(
    State(state): State<AppState>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let post = state.publisher.publish(&body).await.map_err(|e| {
        error!(error = %e, "Publish failed");
        ApiError::from_publish(e)
    })?;
    Ok(Json(PublishResponse {
        status: "success",
        link: post.link,
    }))
}
