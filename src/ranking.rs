//! Intent → query → candidates → top picks.
//!
//! The steps are strictly sequential, each consuming the previous output:
//!
//! 1. Ask the completion model to turn the intent into one search query.
//! 2. Search, keeping the first [`MAX_CANDIDATES`] records.
//! 3. With no candidates, stop: the result is `nothing_found`, not an error.
//! 4. List candidates as `ID <index>: <title>` and ask the model for the best
//!    [`MAX_PICKS`] as comma-separated indices.
//! 5. Parse the answer. A token that is not an integer fails the selection;
//!    an integer outside the candidate range is skipped.
//! 6. Keep the model's order (duplicates included), rank from 1, cap at
//!    [`MAX_PICKS`].

use crate::error::{Result, UpstreamError};
use crate::models::{Candidate, RankedResult, RankedSelection, SelectionStatus};
use crate::providers::{SearchProvider, TextCompletion};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const MAX_CANDIDATES: usize = 10;
pub const MAX_PICKS: usize = 3;

const QUERY_INSTRUCTION: &str = "You are an SEO specialist. Turn the user's wish into one \
     powerful news search query for Google News. Answer with the query only.";

fn selection_instruction(intent: &str) -> String {
    format!(
        "Based on '{intent}', choose the IDs of the {MAX_PICKS} best news items. \
         Answer only with the IDs separated by commas (e.g. 0, 2, 5)."
    )
}

/// One `ID <index>: <title>` line per candidate.
fn candidate_listing(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("ID {}: {}", i, c.title))
        .join("\n")
}

/// Split the model's answer on commas and parse every trimmed token.
///
/// Any token that is not an integer makes the whole answer malformed.
fn parse_selection(answer: &str) -> Result<Vec<i64>> {
    answer
        .split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| {
                UpstreamError::malformed(
                    "openai",
                    format!("selection token {token:?} is not an index in answer {answer:?}"),
                )
            })
        })
        .collect()
}

/// Map indices back to candidates, dropping out-of-range ones.
fn resolve_selection(indices: &[i64], candidates: &[Candidate]) -> Vec<RankedResult> {
    indices
        .iter()
        .filter_map(|&idx| {
            let hit = usize::try_from(idx).ok().and_then(|i| candidates.get(i));
            if hit.is_none() {
                debug!(index = idx, count = candidates.len(), "Skipping out-of-range index");
            }
            hit
        })
        .take(MAX_PICKS)
        .enumerate()
        .map(|(pos, candidate)| RankedResult::from_candidate(pos + 1, candidate))
        .collect()
}

/// Turns a free-text intent into the model's picks from a news search.
pub struct Ranker {
    completion: Arc<dyn TextCompletion>,
    search: Arc<dyn SearchProvider>,
}

impl Ranker {
    /// Create a ranker over the given backends.
    ///
    /// # Arguments
    ///
    /// * `completion` - Builds the search query and makes the picks
    /// * `search` - Supplies candidates for the query
    pub fn new(completion: Arc<dyn TextCompletion>, search: Arc<dyn SearchProvider>) -> Self {
        Self { completion, search }
    }

    /// Run the whole ranking stage for `intent`.
    ///
    /// Fails fast with the first [`UpstreamError`]; no partial results.
    #[instrument(level = "info", skip_all, fields(intent = %truncate_for_log(intent, 120)))]
    pub async fn rank(&self, intent: &str) -> Result<RankedSelection> {
        let query = self.completion.complete(QUERY_INSTRUCTION, intent).await?;
        info!(%query, "Built search query");

        let mut candidates = self.search.search(&query).await?;
        candidates.truncate(MAX_CANDIDATES);
        if candidates.is_empty() {
            warn!(%query, "Search found no candidates");
            return Ok(RankedSelection::nothing_found(query));
        }

        let answer = self
            .completion
            .complete(&selection_instruction(intent), &candidate_listing(&candidates))
            .await?;
        let indices = parse_selection(&answer)?;
        let results = resolve_selection(&indices, &candidates);

        info!(
            candidates = candidates.len(),
            requested = indices.len(),
            picked = results.len(),
            "Ranked candidates"
        );
        Ok(RankedSelection {
            query,
            results,
            status: SelectionStatus::Ranked,
        })
    }
}
