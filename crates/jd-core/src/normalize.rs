//! Cleanup of raw scraped text before measurement and splitting.
//!
//! Scraped job postings arrive with irregular whitespace and repeated
//! navigation/footer fragments. Cleanup collapses each paragraph to
//! single-spaced prose while keeping paragraph boundaries (`\n\n`) as
//! splitting hints for the chunker.

use crate::types::SummarizeError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid regex"));

/// Paragraphs at or below this length are boilerplate candidates.
const BOILERPLATE_MAX_CHARS: usize = 40;
/// A short paragraph repeated this many times is treated as boilerplate.
const BOILERPLATE_MIN_REPEATS: usize = 3;

/// Normalize raw scraped text.
///
/// - collapses runs of spaces/tabs to a single space
/// - joins the lines of a paragraph into single-spaced prose
/// - preserves paragraph boundaries as `\n\n`
/// - drops short paragraphs repeated three or more times (navigation, footers)
///
/// Idempotent: `clean(clean(x)) == clean(x)`.
///
/// Fails with [`SummarizeError::EmptyContent`] on empty or whitespace-only
/// input, before any token estimation occurs.
pub fn clean(raw: &str) -> Result<String, SummarizeError> {
    if raw.trim().is_empty() {
        return Err(SummarizeError::EmptyContent);
    }

    let text = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = WHITESPACE_RUN.replace_all(line.trim(), " ").into_owned();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for paragraph in &paragraphs {
        *occurrences.entry(paragraph.as_str()).or_insert(0) += 1;
    }

    let kept: Vec<&String> = paragraphs
        .iter()
        .filter(|p| {
            let is_boilerplate = p.chars().count() <= BOILERPLATE_MAX_CHARS
                && occurrences[p.as_str()] >= BOILERPLATE_MIN_REPEATS;
            if is_boilerplate {
                tracing::debug!(line = p.as_str(), "dropping repeated boilerplate line");
            }
            !is_boilerplate
        })
        .collect();

    let cleaned = kept
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    if cleaned.is_empty() {
        return Err(SummarizeError::EmptyContent);
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        let cleaned = clean("백엔드   개발자\t모집").unwrap();
        assert_eq!(cleaned, "백엔드 개발자 모집");
    }

    #[test]
    fn joins_paragraph_lines_into_prose() {
        let cleaned = clean("회사 소개는\n이렇습니다.\n\n주요 업무는\n저렇습니다.").unwrap();
        assert_eq!(cleaned, "회사 소개는 이렇습니다.\n\n주요 업무는 저렇습니다.");
    }

    #[test]
    fn collapses_extra_blank_lines() {
        let cleaned = clean("첫 문단\n\n\n\n둘째 문단").unwrap();
        assert_eq!(cleaned, "첫 문단\n\n둘째 문단");
    }

    #[test]
    fn removes_repeated_short_lines() {
        let raw = "메뉴\n\n지원하기 내용입니다. 자세한 소개가 이어집니다.\n\n메뉴\n\n복지 안내 문단입니다.\n\n메뉴";
        let cleaned = clean(raw).unwrap();
        assert!(!cleaned.contains("메뉴"));
        assert!(cleaned.contains("복지 안내"));
    }

    #[test]
    fn keeps_short_lines_repeated_less_than_three_times() {
        let raw = "마감 임박\n\n본문입니다.\n\n마감 임박";
        let cleaned = clean(raw).unwrap();
        assert!(cleaned.contains("마감 임박"));
    }

    #[test]
    fn is_idempotent() {
        let raw = "홈\n\n회사   소개\n줄바꿈 포함\n\n\n홈\n\n업무 내용 설명이 깁니다.\n\n홈";
        let once = clean(raw).unwrap();
        let twice = clean(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(clean(""), Err(SummarizeError::EmptyContent)));
    }

    #[test]
    fn rejects_whitespace_only_input() {
        assert!(matches!(clean("   \n\t  \n"), Err(SummarizeError::EmptyContent)));
    }

    #[test]
    fn rejects_input_that_is_all_boilerplate() {
        let raw = "로그인\n\n로그인\n\n로그인";
        assert!(matches!(clean(raw), Err(SummarizeError::EmptyContent)));
    }

    #[test]
    fn normalizes_windows_line_endings() {
        let cleaned = clean("첫 줄\r\n둘째 줄\r\n\r\n새 문단").unwrap();
        assert_eq!(cleaned, "첫 줄 둘째 줄\n\n새 문단");
    }
}
