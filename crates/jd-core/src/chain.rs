//! High-level summary chain.
//!
//! Cleans and validates content, then runs either the direct single-call path
//! or the lazily constructed map-reduce orchestrator. This is the surface the
//! application layer consumes.

use crate::estimator::{validate_content_size, HeuristicTokenEstimator, TokenEstimator};
use crate::invoker::ModelInvoker;
use crate::normalize;
use crate::pipeline::orchestrator::MapReduceOrchestrator;
use crate::pipeline::retry::invoke_with_retry;
use crate::pipeline::MapReduceConfig;
use crate::prompts;
use crate::types::{ProcessingStats, RecommendedAction, Stage, SummarizeError, ValidationResult};
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// Validation outcome plus map-reduce planning, for pre-flight inspection.
#[derive(Debug, Clone, Serialize)]
pub struct ContentAnalysis {
    #[serde(flatten)]
    pub validation: ValidationResult,
    /// Present when the content would go through map-reduce
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapreduce: Option<ProcessingStats>,
}

/// Job-posting summary chain with automatic size handling.
pub struct SummaryChain {
    invoker: Arc<dyn ModelInvoker>,
    estimator: Arc<dyn TokenEstimator>,
    config: MapReduceConfig,
    // Built on first oversized input; most postings never need map-reduce.
    mapreduce: OnceLock<MapReduceOrchestrator>,
}

impl SummaryChain {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self::with_config(invoker, MapReduceConfig::default())
    }

    pub fn with_config(invoker: Arc<dyn ModelInvoker>, config: MapReduceConfig) -> Self {
        Self {
            invoker,
            estimator: Arc::new(HeuristicTokenEstimator::default()),
            config,
            mapreduce: OnceLock::new(),
        }
    }

    pub fn with_estimator(mut self, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    fn mapreduce(&self) -> &MapReduceOrchestrator {
        self.mapreduce.get_or_init(|| {
            tracing::debug!("initializing map-reduce orchestrator");
            MapReduceOrchestrator::with_estimator(
                Arc::clone(&self.invoker),
                Arc::clone(&self.estimator),
                self.config.clone(),
            )
        })
    }

    /// Validate content size against the configured limits.
    pub fn validate_content_size(&self, content: &str) -> Result<ValidationResult, SummarizeError> {
        let text = normalize::clean(content)?;
        Ok(validate_content_size(
            &text,
            self.estimator.as_ref(),
            &self.config.limits,
        ))
    }

    /// Summarize a job posting, choosing the direct or map-reduce path by
    /// estimated size.
    pub async fn run_summary(
        &self,
        content: &str,
        verbose: bool,
    ) -> Result<String, SummarizeError> {
        let text = normalize::clean(content)?;
        let validation =
            validate_content_size(&text, self.estimator.as_ref(), &self.config.limits);
        let stats = &validation.stats;

        if verbose {
            tracing::info!(
                char_count = stats.char_count,
                estimated_tokens = stats.estimated_tokens,
                action = ?stats.recommended_action,
                "content analysis"
            );
        }

        match stats.recommended_action {
            RecommendedAction::Reject => Err(SummarizeError::ContentTooLarge {
                estimated_tokens: stats.estimated_tokens,
                reject_limit: self.config.limits.reject_limit,
            }),
            RecommendedAction::Direct => {
                tracing::debug!("running direct summary");
                self.invoke_direct(&prompts::render_summary_prompt(&text))
                    .await
            }
            RecommendedAction::Chunk => {
                tracing::debug!("running map-reduce summary");
                self.mapreduce().process_large_content(&text, verbose).await
            }
        }
    }

    /// Summarize with a caller-supplied output format instead of the
    /// canonical headings.
    ///
    /// Content small enough for a single call is summarized directly with
    /// the custom prompt. Oversized content is condensed through map-reduce
    /// first, then reformatted in one final call, so the custom format
    /// always shapes the output the caller sees.
    pub async fn run_summary_with_format(
        &self,
        content: &str,
        custom_format: &str,
    ) -> Result<String, SummarizeError> {
        let text = normalize::clean(content)?;
        let validation =
            validate_content_size(&text, self.estimator.as_ref(), &self.config.limits);
        let stats = &validation.stats;

        match stats.recommended_action {
            RecommendedAction::Reject => Err(SummarizeError::ContentTooLarge {
                estimated_tokens: stats.estimated_tokens,
                reject_limit: self.config.limits.reject_limit,
            }),
            RecommendedAction::Direct => {
                self.invoke_direct(&prompts::custom_summary_prompt(&text, custom_format))
                    .await
            }
            RecommendedAction::Chunk => {
                tracing::debug!("condensing before custom-format pass");
                let condensed = self.mapreduce().process_large_content(&text, false).await?;
                self.invoke_direct(&prompts::custom_summary_prompt(&condensed, custom_format))
                    .await
            }
        }
    }

    async fn invoke_direct(&self, prompt: &str) -> Result<String, SummarizeError> {
        invoke_with_retry(self.invoker.as_ref(), prompt, &self.config.retry)
            .await
            .map_err(|(retries, source)| SummarizeError::ModelInvocation {
                stage: Stage::Direct,
                level: 0,
                chunk_index: None,
                retries,
                source,
            })
    }

    /// Validation plus, when chunking would be required, call-count planning.
    /// Performs zero model calls.
    pub fn content_analysis(&self, content: &str) -> Result<ContentAnalysis, SummarizeError> {
        let text = normalize::clean(content)?;
        let validation =
            validate_content_size(&text, self.estimator.as_ref(), &self.config.limits);

        let mapreduce = if validation.needs_processing
            && validation.stats.recommended_action == RecommendedAction::Chunk
        {
            Some(self.mapreduce().get_processing_stats(&text)?)
        } else {
            None
        };

        Ok(ContentAnalysis {
            validation,
            mapreduce,
        })
    }
}
