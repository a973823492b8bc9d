//! Core types for token-budgeted summarization.

use crate::invoker::InvokeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Processing decision derived from the estimated token count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    /// Content fits in a single model call.
    Direct,
    /// Content must be split and processed via map-reduce.
    Chunk,
    /// Content exceeds the reject threshold and is not processed at all.
    Reject,
}

/// Size statistics for one piece of content. Computed once per call, immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStats {
    /// Number of characters (Unicode scalar values) in the content
    pub char_count: usize,
    /// Estimated token count via the characters-per-token heuristic
    pub estimated_tokens: u32,
    /// Processing decision for this content size
    pub recommended_action: RecommendedAction,
}

/// Result of size validation. Pure function of the input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub stats: ContentStats,
    /// True when content exceeds the direct-call limit
    pub needs_processing: bool,
}

/// One bounded, non-overlapping slice of normalized content.
///
/// Invariant: chunks concatenated in index order exactly reconstruct the
/// normalized content they were split from.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// 0-based position; defines processing and merge order
    pub index: usize,
    /// Contiguous slice of the normalized content
    pub text: String,
    /// Token estimate for this slice
    pub estimated_tokens: u32,
}

/// Intermediate per-chunk summary produced by the map stage.
///
/// Consumed by the reduce stage and discarded once the final summary is
/// returned; never persisted.
#[derive(Debug, Clone)]
pub struct PartialSummary {
    pub chunk_index: usize,
    pub text: String,
}

/// Pre-flight cost estimate. Derivable without performing any model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub chunk_count: usize,
    pub total_estimated_tokens: u32,
    pub estimated_model_calls: usize,
}

/// Token thresholds driving the processing decision.
///
/// Invariant: `direct_limit < chunk_limit <= reject_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLimits {
    /// Content at or below this fits a single model call
    pub direct_limit: u32,
    /// Soft threshold; crossing it logs a warning about unusually large input
    pub chunk_limit: u32,
    /// Content above this is rejected outright
    pub reject_limit: u32,
}

impl TokenLimits {
    pub fn new(direct_limit: u32, chunk_limit: u32, reject_limit: u32) -> Self {
        debug_assert!(direct_limit < chunk_limit && chunk_limit <= reject_limit);
        Self {
            direct_limit,
            chunk_limit,
            reject_limit,
        }
    }
}

impl Default for TokenLimits {
    fn default() -> Self {
        Self {
            direct_limit: 2_000,
            chunk_limit: 100_000,
            reject_limit: 100_000,
        }
    }
}

/// Pipeline stage for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Direct,
    Map,
    Reduce,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Direct => write!(f, "direct"),
            Stage::Map => write!(f, "map"),
            Stage::Reduce => write!(f, "reduce"),
        }
    }
}

/// Errors that can occur during summarization.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Input was empty or whitespace-only; raised before any token estimation
    #[error("content is empty after cleanup")]
    EmptyContent,

    /// Estimated tokens exceed the reject threshold; no model call was made
    #[error("content too large: {estimated_tokens} estimated tokens exceeds reject limit {reject_limit}")]
    ContentTooLarge {
        estimated_tokens: u32,
        reject_limit: u32,
    },

    /// A model call failed after exhausting retries
    #[error("model call failed in {stage} stage (level {level}, chunk {chunk_index:?}) after {retries} retries: {source}")]
    ModelInvocation {
        stage: Stage,
        /// Reduce level at which the failure occurred (0 for map/direct)
        level: u32,
        /// Originating chunk, when the failure is attributable to one
        chunk_index: Option<usize>,
        retries: u32,
        #[source]
        source: InvokeError,
    },

    /// Wall-clock budget for the whole operation expired
    #[error("summarization exceeded wall-clock budget of {budget:?}")]
    Timeout { budget: Duration },
}
