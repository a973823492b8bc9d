//! Token estimation for budget decisions.
//!
//! The character-per-token heuristic is a deliberate stand-in for a real
//! tokenizer; keeping it behind [`TokenEstimator`] lets a precise tokenizer be
//! substituted without touching chunking or reduce logic.

use crate::types::{ContentStats, RecommendedAction, TokenLimits, ValidationResult};

/// Trait for token estimation implementations.
pub trait TokenEstimator: Send + Sync {
    /// Estimate the token count of a plain text string. Deterministic and pure.
    fn estimate_tokens(&self, text: &str) -> u32;
}

/// Heuristic estimator using a fixed characters-per-token ratio.
#[derive(Debug, Clone)]
pub struct HeuristicTokenEstimator {
    /// Characters per token (default: 4)
    chars_per_token: f64,
}

impl HeuristicTokenEstimator {
    pub fn new(chars_per_token: f64) -> Self {
        debug_assert!(chars_per_token > 0.0);
        Self { chars_per_token }
    }
}

impl Default for HeuristicTokenEstimator {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl TokenEstimator for HeuristicTokenEstimator {
    fn estimate_tokens(&self, text: &str) -> u32 {
        if text.is_empty() {
            return 0;
        }
        let char_count = text.chars().count() as f64;
        (char_count / self.chars_per_token).ceil() as u32
    }
}

/// Classify content size into a processing decision.
///
/// Boundary values are inclusive on the lower side of each bucket:
/// `estimated_tokens == direct_limit` is still `Direct`, and
/// `estimated_tokens == reject_limit` is still `Chunk`.
pub fn validate_content_size(
    text: &str,
    estimator: &dyn TokenEstimator,
    limits: &TokenLimits,
) -> ValidationResult {
    let char_count = text.chars().count();
    let estimated_tokens = estimator.estimate_tokens(text);

    let recommended_action = if estimated_tokens <= limits.direct_limit {
        RecommendedAction::Direct
    } else if estimated_tokens <= limits.reject_limit {
        if estimated_tokens > limits.chunk_limit {
            tracing::warn!(
                estimated_tokens,
                chunk_limit = limits.chunk_limit,
                "content exceeds the chunk threshold but is still accepted"
            );
        }
        RecommendedAction::Chunk
    } else {
        RecommendedAction::Reject
    };

    ValidationResult {
        needs_processing: estimated_tokens > limits.direct_limit,
        stats: ContentStats {
            char_count,
            estimated_tokens,
            recommended_action,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_with_default_ratio() {
        let estimator = HeuristicTokenEstimator::default();
        // 8 chars / 4 = 2 tokens
        assert_eq!(estimator.estimate_tokens("abcdefgh"), 2);
        // 9 chars -> ceil(9/4) = 3 tokens
        assert_eq!(estimator.estimate_tokens("abcdefghi"), 3);
    }

    #[test]
    fn empty_text_estimates_zero() {
        let estimator = HeuristicTokenEstimator::default();
        assert_eq!(estimator.estimate_tokens(""), 0);
    }

    #[test]
    fn counts_unicode_scalars_not_bytes() {
        let estimator = HeuristicTokenEstimator::default();
        // 4 Hangul syllables are 12 bytes but 4 chars -> 1 token
        assert_eq!(estimator.estimate_tokens("채용공고"), 1);
    }

    #[test]
    fn custom_ratio_applies() {
        let estimator = HeuristicTokenEstimator::new(2.0);
        assert_eq!(estimator.estimate_tokens("test"), 2);
    }

    #[test]
    fn exact_direct_limit_is_direct() {
        let estimator = HeuristicTokenEstimator::default();
        let limits = TokenLimits::new(10, 50, 50);

        // 40 chars -> exactly 10 tokens
        let text = "a".repeat(40);
        let result = validate_content_size(&text, &estimator, &limits);
        assert_eq!(result.stats.recommended_action, RecommendedAction::Direct);
        assert!(!result.needs_processing);
    }

    #[test]
    fn one_past_direct_limit_is_chunk() {
        let estimator = HeuristicTokenEstimator::default();
        let limits = TokenLimits::new(10, 50, 50);

        // 44 chars -> 11 tokens, one over the direct limit
        let text = "a".repeat(44);
        let result = validate_content_size(&text, &estimator, &limits);
        assert_eq!(result.stats.recommended_action, RecommendedAction::Chunk);
        assert!(result.needs_processing);
    }

    #[test]
    fn exact_reject_limit_is_still_chunk() {
        let estimator = HeuristicTokenEstimator::default();
        let limits = TokenLimits::new(10, 50, 50);

        let text = "a".repeat(200); // exactly 50 tokens
        let result = validate_content_size(&text, &estimator, &limits);
        assert_eq!(result.stats.recommended_action, RecommendedAction::Chunk);
    }

    #[test]
    fn past_reject_limit_is_reject() {
        let estimator = HeuristicTokenEstimator::default();
        let limits = TokenLimits::new(10, 50, 50);

        let text = "a".repeat(204); // 51 tokens
        let result = validate_content_size(&text, &estimator, &limits);
        assert_eq!(result.stats.recommended_action, RecommendedAction::Reject);
    }

    #[test]
    fn stats_carry_char_count() {
        let estimator = HeuristicTokenEstimator::default();
        let limits = TokenLimits::default();

        let result = validate_content_size("hello", &estimator, &limits);
        assert_eq!(result.stats.char_count, 5);
        assert_eq!(result.stats.estimated_tokens, 2);
    }
}
