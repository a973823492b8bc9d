//! Map-reduce summarization pipeline.
//!
//! The map stage summarizes chunks independently under a bounded worker pool;
//! the reduce stage merges partial summaries level by level until one
//! templated result remains. The orchestrator sequences
//! validation → chunk → map → reduce under a wall-clock budget.

pub mod map;
pub mod orchestrator;
pub mod reduce;
pub mod retry;

use crate::pipeline::retry::RetryStrategy;
use crate::types::TokenLimits;
use std::time::Duration;

/// Policy for a chunk whose map call fails after exhausting retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFailurePolicy {
    /// Abort the whole pipeline; no partial output is ever returned.
    ///
    /// The default: job-posting facts must not be silently dropped.
    Abort,
    /// Substitute a clearly flagged placeholder partial and continue.
    Placeholder,
}

/// Configuration for the map-reduce pipeline.
#[derive(Debug, Clone)]
pub struct MapReduceConfig {
    pub limits: TokenLimits,
    /// Per-chunk token budget for the map stage
    pub max_tokens_per_chunk: u32,
    /// Concurrent map-call slots
    pub concurrency: usize,
    /// Per-call retry behaviour
    pub retry: RetryStrategy,
    /// Wall-clock budget for one whole summarization
    pub timeout: Duration,
    pub chunk_failure_policy: ChunkFailurePolicy,
}

impl Default for MapReduceConfig {
    fn default() -> Self {
        let limits = TokenLimits::default();
        Self {
            max_tokens_per_chunk: limits.direct_limit,
            limits,
            concurrency: 3,
            retry: RetryStrategy::default(),
            timeout: Duration::from_secs(300),
            chunk_failure_policy: ChunkFailurePolicy::Abort,
        }
    }
}
