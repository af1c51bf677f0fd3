//! Data models for candidates, ranked picks, extraction outcomes and posts.
//!
//! This module defines the core data structures passed between the stages:
//! - [`Candidate`]: Raw search record, in provider order
//! - [`RankedResult`] / [`RankedSelection`]: Output of the ranking stage
//! - [`ExtractionOutcome`] / [`AggregatedDocument`]: Output of the extraction stage
//! - [`PublishRequest`] / [`PublishedPost`]: Input and output of the publish stage
//!
//! Nothing here is persisted; every value lives for one request.

use crate::error::ExtractionFailure;
use serde::{Deserialize, Serialize};

/// A single search result before ranking.
///
/// The position of a candidate in the provider's list is its selection index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// The headline of the news item.
    pub title: String,
    /// The publishing outlet, when the provider reports one.
    pub source_name: Option<String>,
    /// Link to the full article.
    pub link: String,
}

/// A candidate picked by the completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    /// 1-based position within the accepted selection.
    pub rank: usize,
    pub title: String,
    #[serde(rename = "source")]
    pub source_name: Option<String>,
    pub link: String,
}

impl RankedResult {
    pub fn from_candidate(rank: usize, candidate: &Candidate) -> Self {
        Self {
            rank,
            title: candidate.title.clone(),
            source_name: candidate.source_name.clone(),
            link: candidate.link.clone(),
        }
    }
}

/// Whether the ranking stage had anything to rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Ranked,
    NothingFound,
}

/// Result of ranking an intent: the generated query and up to three picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSelection {
    pub query: String,
    pub results: Vec<RankedResult>,
    pub status: SelectionStatus,
}

impl RankedSelection {
    pub fn nothing_found(query: String) -> Self {
        Self {
            query,
            results: Vec::new(),
            status: SelectionStatus::NothingFound,
        }
    }
}

/// What became of one extraction request.
#[derive(Debug)]
pub enum ExtractionOutcome {
    Success(String),
    Failure(ExtractionFailure),
}

impl ExtractionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExtractionOutcome::Failure(_))
    }

    /// Render the block for the source at 1-based position `source_number`.
    pub fn render_block(&self, source_number: usize) -> String {
        match self {
            ExtractionOutcome::Success(text) => {
                format!("\n--- SOURCE CONTENT {source_number} ---\n{text}\n")
            }
            ExtractionOutcome::Failure(_) => {
                format!("\n[Failed to read source {source_number}]\n")
            }
        }
    }
}

/// Concatenated extraction blocks, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedDocument {
    pub text: String,
    /// Number of URLs requested (and therefore of blocks).
    pub sources: usize,
    /// Number of blocks that are failure markers.
    pub failures: usize,
}

impl AggregatedDocument {
    /// Build the document from outcomes indexed by input position.
    pub fn from_outcomes(outcomes: &[ExtractionOutcome]) -> Self {
        let text = outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| outcome.render_block(i + 1))
            .collect::<String>();
        Self {
            text,
            sources: outcomes.len(),
            failures: outcomes.iter().filter(|o| o.is_failure()).count(),
        }
    }
}

/// Post visibility understood by the CMS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Future,
}

/// A finished article ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
}

/// The CMS's answer to a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedPost {
    /// Canonical link of the published resource.
    pub link: String,
}
