//! Reduce stage: hierarchical merge of partial summaries.

use crate::estimator::TokenEstimator;
use crate::invoker::ModelInvoker;
use crate::pipeline::retry::invoke_with_retry;
use crate::pipeline::MapReduceConfig;
use crate::prompts;
use crate::types::{PartialSummary, Stage, SummarizeError};

/// Merge partial summaries into one templated result.
///
/// Partials are concatenated in chunk-index order. When the joined text fits
/// the direct limit, one merge call produces the final result. Otherwise the
/// partials are grouped into budget-fitting batches, each batch is reduced
/// sequentially, and the batch outputs are merged again; every level strictly
/// reduces the item count, so this terminates within O(log n) levels.
pub(crate) async fn run_reduce_stage(
    invoker: &dyn ModelInvoker,
    partials: Vec<PartialSummary>,
    config: &MapReduceConfig,
    estimator: &dyn TokenEstimator,
) -> Result<String, SummarizeError> {
    let mut texts: Vec<String> = partials.into_iter().map(|p| p.text).collect();
    let mut level: u32 = 1;

    loop {
        let joined = texts.join("\n\n");
        let joined_tokens = estimator.estimate_tokens(&joined);
        if joined_tokens <= config.limits.direct_limit || texts.len() == 1 {
            if texts.len() == 1 && joined_tokens > config.limits.direct_limit {
                tracing::warn!(
                    joined_tokens,
                    direct_limit = config.limits.direct_limit,
                    "single partial exceeds direct limit, merging anyway"
                );
            }
            tracing::debug!(level, items = texts.len(), "final merge");
            let prompt = prompts::render_reduce_prompt(&joined);
            return invoke_with_retry(invoker, &prompt, &config.retry)
                .await
                .map_err(|(retries, source)| SummarizeError::ModelInvocation {
                    stage: Stage::Reduce,
                    level,
                    chunk_index: None,
                    retries,
                    source,
                });
        }

        let batches = batch_within_budget(&texts, estimator, config.limits.direct_limit);
        tracing::debug!(level, items = texts.len(), batches = batches.len(), "reduce level");

        // Sequential: each level depends on the full output of the previous one.
        let mut next = Vec::with_capacity(batches.len());
        for batch in batches {
            let prompt = prompts::render_reduce_prompt(&batch);
            let merged = invoke_with_retry(invoker, &prompt, &config.retry)
                .await
                .map_err(|(retries, source)| SummarizeError::ModelInvocation {
                    stage: Stage::Reduce,
                    level,
                    chunk_index: None,
                    retries,
                    source,
                })?;
            next.push(merged);
        }
        texts = next;
        level += 1;
    }
}

/// Group consecutive items into batches whose joined token estimate fits the
/// budget. Falls back to pairing when greedy grouping would not reduce the
/// item count, so each level always makes progress.
fn batch_within_budget(
    items: &[String],
    estimator: &dyn TokenEstimator,
    budget: u32,
) -> Vec<String> {
    let mut batches: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens: u32 = 0;

    for item in items {
        let item_tokens = estimator.estimate_tokens(item);
        if !current.is_empty() && current_tokens.saturating_add(item_tokens) > budget {
            batches.push(current.join("\n\n"));
            current.clear();
            current_tokens = 0;
        }
        current.push(item.as_str());
        current_tokens = current_tokens.saturating_add(item_tokens);
    }
    if !current.is_empty() {
        batches.push(current.join("\n\n"));
    }

    if batches.len() >= items.len() && items.len() > 1 {
        return items
            .chunks(2)
            .map(|pair| pair.join("\n\n"))
            .collect();
    }
    batches
}
