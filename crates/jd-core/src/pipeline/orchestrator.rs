//! Pipeline orchestration: validate → chunk → map → reduce.

use crate::chunker;
use crate::estimator::{validate_content_size, HeuristicTokenEstimator, TokenEstimator};
use crate::invoker::ModelInvoker;
use crate::normalize;
use crate::pipeline::{map, reduce, MapReduceConfig};
use crate::types::{ProcessingStats, RecommendedAction, SummarizeError};
use std::sync::Arc;

/// Assumed token size of one map-stage partial summary, used only for
/// pre-flight call-count estimation.
const ESTIMATED_PARTIAL_TOKENS: u32 = 512;

/// Drives the map-reduce pipeline for content too large for a single call.
pub struct MapReduceOrchestrator {
    invoker: Arc<dyn ModelInvoker>,
    estimator: Arc<dyn TokenEstimator>,
    config: MapReduceConfig,
}

impl MapReduceOrchestrator {
    pub fn new(invoker: Arc<dyn ModelInvoker>, config: MapReduceConfig) -> Self {
        Self::with_estimator(invoker, Arc::new(HeuristicTokenEstimator::default()), config)
    }

    pub fn with_estimator(
        invoker: Arc<dyn ModelInvoker>,
        estimator: Arc<dyn TokenEstimator>,
        config: MapReduceConfig,
    ) -> Self {
        Self {
            invoker,
            estimator,
            config,
        }
    }

    /// Summarize oversized content and return one templated string.
    ///
    /// Rejection and validation happen before any model call. The whole
    /// operation runs under the configured wall-clock budget; on expiry
    /// in-flight calls are abandoned and no partial summary is returned.
    pub async fn process_large_content(
        &self,
        content: &str,
        verbose: bool,
    ) -> Result<String, SummarizeError> {
        let text = normalize::clean(content)?;
        let validation = validate_content_size(&text, self.estimator.as_ref(), &self.config.limits);
        let stats = &validation.stats;

        if verbose {
            tracing::info!(
                char_count = stats.char_count,
                estimated_tokens = stats.estimated_tokens,
                action = ?stats.recommended_action,
                "content analysis"
            );
        }

        if stats.recommended_action == RecommendedAction::Reject {
            return Err(SummarizeError::ContentTooLarge {
                estimated_tokens: stats.estimated_tokens,
                reject_limit: self.config.limits.reject_limit,
            });
        }

        let pipeline = async {
            let chunks = chunker::split(
                &text,
                self.config.max_tokens_per_chunk,
                self.estimator.as_ref(),
            );
            tracing::info!(chunk_count = chunks.len(), "content chunked");

            let partials = map::run_map_stage(&self.invoker, &chunks, &self.config).await?;
            tracing::info!(partial_count = partials.len(), "map stage complete");

            let summary = reduce::run_reduce_stage(
                self.invoker.as_ref(),
                partials,
                &self.config,
                self.estimator.as_ref(),
            )
            .await?;
            tracing::info!("reduce stage complete");
            Ok(summary)
        };

        match tokio::time::timeout(self.config.timeout, pipeline).await {
            Ok(result) => result,
            Err(_) => Err(SummarizeError::Timeout {
                budget: self.config.timeout,
            }),
        }
    }

    /// Predict call count and token totals without executing any model call.
    pub fn get_processing_stats(&self, content: &str) -> Result<ProcessingStats, SummarizeError> {
        let text = normalize::clean(content)?;
        let validation = validate_content_size(&text, self.estimator.as_ref(), &self.config.limits);
        let stats = &validation.stats;

        if stats.recommended_action == RecommendedAction::Reject {
            return Err(SummarizeError::ContentTooLarge {
                estimated_tokens: stats.estimated_tokens,
                reject_limit: self.config.limits.reject_limit,
            });
        }

        let chunks = chunker::split(
            &text,
            self.config.max_tokens_per_chunk,
            self.estimator.as_ref(),
        );
        let chunk_count = chunks.len();
        let reduce_calls = estimate_reduce_calls(chunk_count, self.config.limits.direct_limit);

        Ok(ProcessingStats {
            chunk_count,
            total_estimated_tokens: stats.estimated_tokens,
            estimated_model_calls: chunk_count + reduce_calls,
        })
    }
}

/// Simulate reduce levels assuming each partial is roughly
/// [`ESTIMATED_PARTIAL_TOKENS`] tokens.
fn estimate_reduce_calls(chunk_count: usize, direct_limit: u32) -> usize {
    if chunk_count == 0 {
        return 0;
    }
    let batch_size = (direct_limit / ESTIMATED_PARTIAL_TOKENS).max(2) as usize;
    let mut items = chunk_count;
    let mut calls = 0;
    loop {
        if items <= batch_size {
            calls += 1; // final merge
            return calls;
        }
        let batches = items.div_ceil(batch_size);
        calls += batches;
        items = batches;
    }
}
