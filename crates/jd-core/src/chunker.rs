//! Boundary-snapping content splitting.
//!
//! Walks normalized content accumulating paragraph units until the running
//! token estimate would exceed the per-chunk budget, cutting at the nearest
//! preceding boundary. Paragraphs that alone exceed the budget fall back to
//! sentence units, and oversized sentences to hard character-offset cuts.

use crate::estimator::TokenEstimator;
use crate::types::Chunk;

/// Split normalized content into ordered, bounded, non-overlapping chunks.
///
/// The returned chunks, concatenated in index order, exactly reconstruct the
/// input text. Every chunk satisfies
/// `estimate_tokens(chunk.text) <= max_tokens_per_chunk` up to the
/// boundary-snapping tolerance.
pub fn split(text: &str, max_tokens_per_chunk: u32, estimator: &dyn TokenEstimator) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }
    let budget = max_tokens_per_chunk.max(1);

    // Flatten the text into an ordered partition of bounded units.
    let mut units: Vec<&str> = Vec::new();
    for paragraph in text.split_inclusive("\n\n") {
        if estimator.estimate_tokens(paragraph) <= budget {
            units.push(paragraph);
            continue;
        }
        for sentence in paragraph.split_inclusive(['.', '!', '?']) {
            if estimator.estimate_tokens(sentence) <= budget {
                units.push(sentence);
            } else {
                hard_cut(sentence, budget, estimator, &mut units);
            }
        }
    }

    // Greedy accumulation: cut before a unit would push the chunk over budget.
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current = String::new();
    let mut current_tokens: u32 = 0;
    for unit in units {
        let unit_tokens = estimator.estimate_tokens(unit);
        if !current.is_empty() && current_tokens.saturating_add(unit_tokens) > budget {
            push_chunk(&mut chunks, std::mem::take(&mut current), estimator);
            current_tokens = 0;
        }
        current.push_str(unit);
        current_tokens = current_tokens.saturating_add(unit_tokens);
    }
    if !current.is_empty() {
        push_chunk(&mut chunks, current, estimator);
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: String, estimator: &dyn TokenEstimator) {
    let estimated_tokens = estimator.estimate_tokens(&text);
    chunks.push(Chunk {
        index: chunks.len(),
        text,
        estimated_tokens,
    });
}

/// Cut an oversized unit at character offsets, keeping UTF-8 boundaries.
fn hard_cut<'a>(
    unit: &'a str,
    budget: u32,
    estimator: &dyn TokenEstimator,
    units: &mut Vec<&'a str>,
) {
    let total_chars = unit.chars().count();
    let total_tokens = estimator.estimate_tokens(unit).max(1);
    // Proportional target, then shrink until a probe piece fits the budget.
    let mut piece_chars =
        ((total_chars as u64 * budget as u64) / total_tokens as u64).max(1) as usize;
    loop {
        let probe: String = unit.chars().take(piece_chars).collect();
        if estimator.estimate_tokens(&probe) <= budget || piece_chars == 1 {
            break;
        }
        piece_chars = (piece_chars * 9 / 10).max(1);
    }

    let mut rest = unit;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(piece_chars)
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        let (piece, tail) = rest.split_at(cut);
        units.push(piece);
        rest = tail;
    }
}
