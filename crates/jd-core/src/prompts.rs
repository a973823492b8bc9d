//! Prompt templates for job-posting summarization.
//!
//! The direct-path template and the reduce template enforce the same fixed
//! heading set, so callers cannot distinguish a direct result from a reduced
//! one. [`REQUIRED_HEADINGS`] is the output contract the rest of the
//! application depends on.

/// Canonical headings every final summary must contain verbatim.
pub const REQUIRED_HEADINGS: [&str; 6] = [
    "## 공고명:",
    "### 회사명:",
    "**마감기한**",
    "### A. 회사소개 (비전, 연혁) & 직무 소개 (주요 업무):",
    "### B. 자격요건 (필수조건) & 우대사항 (선택 요건):",
    "### C. 혜택 및 복지 & 기타사항:",
];

/// Direct-path summary template.
pub const SUMMARY_TEMPLATE: &str = "다음 채용 공고 내용을 핵심 정보만 정리하여 한글로 요약해 주세요:

{job_content}

아래 형식으로 정리해주세요:

## 공고명: [공고명]
### 회사명: [회사명]

**마감기한**
- [마감기한]

### A. 회사소개 (비전, 연혁) & 직무 소개 (주요 업무):
- [회사 소개 및 주요 업무 내용]

### B. 자격요건 (필수조건) & 우대사항 (선택 요건):
**필수조건:**
- [필수 자격요건들]

**우대사항:**
- [우대사항들]

### C. 혜택 및 복지 & 기타사항:
- [혜택, 복지, 기타 정보들]
";

/// Map-stage template: compact intermediate summary of one segment,
/// translating non-Korean content into Korean.
pub const MAP_TEMPLATE: &str = "다음 채용공고 텍스트의 핵심 내용을 간단히 요약해주세요.
영어 내용이 있다면 한국어로 번역해서 요약해주세요:

{text}

핵심 요약:";

/// Reduce-stage template: merge partial summaries into the canonical format.
pub const REDUCE_TEMPLATE: &str = "다음은 채용공고의 여러 부분을 요약한 내용들입니다.
이를 종합하여 완전한 채용공고 요약을 만들어주세요:

{text}

아래 형식으로 최종 정리해주세요:

## 공고명: [공고명]
### 회사명: [회사명]

**마감기한**
- [마감기한]

### A. 회사소개 (비전, 연혁) & 직무 소개 (주요 업무):
- [회사 소개 및 주요 업무 내용]

### B. 자격요건 (필수조건) & 우대사항 (선택 요건):
**필수조건:**
- [필수 자격요건들]

**우대사항:**
- [우대사항들]

### C. 혜택 및 복지 & 기타사항:
- [혜택, 복지, 기타 정보들]
";

pub fn render_summary_prompt(job_content: &str) -> String {
    SUMMARY_TEMPLATE.replace("{job_content}", job_content)
}

pub fn render_map_prompt(text: &str) -> String {
    MAP_TEMPLATE.replace("{text}", text)
}

pub fn render_reduce_prompt(text: &str) -> String {
    REDUCE_TEMPLATE.replace("{text}", text)
}

/// Direct-path prompt with a caller-supplied output format.
pub fn custom_summary_prompt(job_content: &str, custom_format: &str) -> String {
    format!(
        "다음 채용 공고 내용을 핵심 정보만 정리하여 요약해 주세요:\n\n{job_content}\n\n{custom_format}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_embeds_content() {
        let prompt = render_summary_prompt("백엔드 개발자 모집");
        assert!(prompt.contains("백엔드 개발자 모집"));
        assert!(!prompt.contains("{job_content}"));
    }

    #[test]
    fn summary_and_reduce_templates_share_headings() {
        for heading in REQUIRED_HEADINGS {
            assert!(SUMMARY_TEMPLATE.contains(heading), "missing in summary: {heading}");
            assert!(REDUCE_TEMPLATE.contains(heading), "missing in reduce: {heading}");
        }
    }

    #[test]
    fn map_prompt_embeds_segment() {
        let prompt = render_map_prompt("세그먼트 본문");
        assert!(prompt.contains("세그먼트 본문"));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn custom_prompt_appends_format() {
        let prompt = custom_summary_prompt("공고 본문", "- 한 줄 요약만");
        assert!(prompt.contains("공고 본문"));
        assert!(prompt.ends_with("- 한 줄 요약만\n"));
    }
}
