//! Token-budgeted summarization core for scraped job postings.
//!
//! Content that fits the model's context window is summarized with a single
//! call; oversized content is split into bounded chunks, each chunk is
//! summarized independently (map stage), and the partial summaries are merged
//! back into one templated result (reduce stage), recursing when the merge
//! input itself would overflow the budget.
//!
//! # Key Components
//!
//! - [`types`]: `ContentStats`, `Chunk`, `ProcessingStats`, error taxonomy
//! - [`estimator`]: heuristic token estimation and size classification
//! - [`normalize`]: cleanup of raw scraped text
//! - [`chunker`]: boundary-snapping content splitting
//! - [`pipeline`]: map/reduce stages and the orchestrator
//! - [`chain`]: high-level summary chain (direct path + lazy map-reduce)

pub mod chain;
pub mod chunker;
pub mod estimator;
pub mod invoker;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod types;

pub use chain::{ContentAnalysis, SummaryChain};
pub use chunker::split;
pub use estimator::{validate_content_size, HeuristicTokenEstimator, TokenEstimator};
pub use invoker::{InvokeError, ModelInvoker};
pub use normalize::clean;
pub use pipeline::orchestrator::MapReduceOrchestrator;
pub use pipeline::retry::RetryStrategy;
pub use pipeline::{ChunkFailurePolicy, MapReduceConfig};
pub use types::{
    Chunk, ContentStats, PartialSummary, ProcessingStats, RecommendedAction, Stage,
    SummarizeError, TokenLimits, ValidationResult,
};
