//! Map stage: independent per-chunk summarization.

use crate::invoker::ModelInvoker;
use crate::pipeline::retry::invoke_with_retry;
use crate::pipeline::{ChunkFailurePolicy, MapReduceConfig};
use crate::prompts;
use crate::types::{Chunk, PartialSummary, Stage, SummarizeError};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Summarize every chunk via the injected model-call capability.
///
/// Chunks are dispatched concurrently up to the configured slot count; each
/// result lands in its own slot and the output order is always the chunk
/// index order, regardless of completion order. A chunk that fails all
/// retries aborts the stage under [`ChunkFailurePolicy::Abort`]; under
/// `Placeholder` a flagged partial is substituted instead.
pub(crate) async fn run_map_stage(
    invoker: &Arc<dyn ModelInvoker>,
    chunks: &[Chunk],
    config: &MapReduceConfig,
) -> Result<Vec<PartialSummary>, SummarizeError> {
    let concurrency = config.concurrency.max(1);
    tracing::debug!(chunk_count = chunks.len(), concurrency, "starting map stage");

    let partials = stream::iter(chunks.iter().map(|chunk| {
        let invoker = Arc::clone(invoker);
        let retry = config.retry.clone();
        let policy = config.chunk_failure_policy;
        async move {
            let prompt = prompts::render_map_prompt(&chunk.text);
            match invoke_with_retry(invoker.as_ref(), &prompt, &retry).await {
                Ok(text) => {
                    tracing::debug!(chunk_index = chunk.index, "chunk summarized");
                    Ok(PartialSummary {
                        chunk_index: chunk.index,
                        text,
                    })
                }
                Err((retries, source)) => match policy {
                    ChunkFailurePolicy::Abort => Err(SummarizeError::ModelInvocation {
                        stage: Stage::Map,
                        level: 0,
                        chunk_index: Some(chunk.index),
                        retries,
                        source,
                    }),
                    ChunkFailurePolicy::Placeholder => {
                        tracing::warn!(
                            chunk_index = chunk.index,
                            retries,
                            error = %source,
                            "substituting placeholder for failed chunk"
                        );
                        Ok(PartialSummary {
                            chunk_index: chunk.index,
                            text: format!("(구간 {} 요약 실패: 내용 누락)", chunk.index),
                        })
                    }
                },
            }
        }
    }))
    .buffered(concurrency)
    .try_collect::<Vec<_>>()
    .await?;

    Ok(partials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{HeuristicTokenEstimator, TokenEstimator};
    use crate::invoker::InvokeError;
    use crate::pipeline::retry::RetryStrategy;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct EchoInvoker {
        prompts: Mutex<Vec<String>>,
        fail_substring: Option<String>,
    }

    impl EchoInvoker {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_substring: None,
            }
        }

        fn failing_on(substring: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_substring: Some(substring.to_string()),
            }
        }
    }

    #[async_trait]
    impl ModelInvoker for EchoInvoker {
        async fn invoke(&self, prompt: &str) -> Result<String, InvokeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(ref marker) = self.fail_substring {
                if prompt.contains(marker.as_str()) {
                    return Err(InvokeError::Api("simulated failure".to_string()));
                }
            }
            Ok(format!("요약: {}", prompt.len()))
        }
    }

    fn make_chunks(texts: &[&str]) -> Vec<Chunk> {
        let estimator = HeuristicTokenEstimator::default();
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                index,
                text: text.to_string(),
                estimated_tokens: estimator.estimate_tokens(text),
            })
            .collect()
    }

    fn fast_config() -> MapReduceConfig {
        MapReduceConfig {
            retry: RetryStrategy::FixedDelay {
                delay: Duration::ZERO,
                max_retries: 1,
            },
            ..MapReduceConfig::default()
        }
    }

    #[tokio::test]
    async fn partials_preserve_chunk_order() {
        let invoker: Arc<dyn ModelInvoker> = Arc::new(EchoInvoker::new());
        let chunks = make_chunks(&["첫 구간", "둘째 구간 내용", "셋째"]);

        let partials = run_map_stage(&invoker, &chunks, &fast_config())
            .await
            .unwrap();

        assert_eq!(partials.len(), 3);
        for (i, partial) in partials.iter().enumerate() {
            assert_eq!(partial.chunk_index, i);
        }
    }

    #[tokio::test]
    async fn each_chunk_gets_map_prompt() {
        let invoker = Arc::new(EchoInvoker::new());
        let dyn_invoker: Arc<dyn ModelInvoker> = invoker.clone();
        let chunks = make_chunks(&["구간 하나", "구간 둘"]);

        run_map_stage(&dyn_invoker, &chunks, &fast_config())
            .await
            .unwrap();

        let prompts = invoker.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().any(|p| p.contains("구간 하나")));
        assert!(prompts.iter().any(|p| p.contains("구간 둘")));
        for prompt in prompts.iter() {
            assert!(prompt.contains("핵심 요약:"));
        }
    }

    #[tokio::test]
    async fn abort_policy_fails_with_chunk_index() {
        let invoker: Arc<dyn ModelInvoker> =
            Arc::new(EchoInvoker::failing_on("실패유발"));
        let chunks = make_chunks(&["정상 구간", "실패유발 구간", "다른 정상 구간"]);

        let err = run_map_stage(&invoker, &chunks, &fast_config())
            .await
            .unwrap_err();

        match err {
            SummarizeError::ModelInvocation {
                stage,
                chunk_index,
                retries,
                ..
            } => {
                assert_eq!(stage, Stage::Map);
                assert_eq!(chunk_index, Some(1));
                assert_eq!(retries, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn placeholder_policy_substitutes_and_continues() {
        let invoker: Arc<dyn ModelInvoker> =
            Arc::new(EchoInvoker::failing_on("실패유발"));
        let chunks = make_chunks(&["정상 구간", "실패유발 구간"]);
        let config = MapReduceConfig {
            chunk_failure_policy: ChunkFailurePolicy::Placeholder,
            ..fast_config()
        };

        let partials = run_map_stage(&invoker, &chunks, &config).await.unwrap();

        assert_eq!(partials.len(), 2);
        assert!(partials[1].text.contains("요약 실패"));
        assert!(partials[1].text.contains('1'));
    }
}
