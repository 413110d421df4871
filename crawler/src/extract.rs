//! Problem statement extraction from fetched HTML.

use cpsearch_core::{Platform, Problem};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const MIN_STATEMENT_CHARS: usize = 20;
const GENERIC_MAX_CHARS: usize = 2000;

static PROBLEM_STATEMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".problem-statement").expect("valid selector"));
static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").expect("valid selector"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static LEETCODE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"div[data-track-load="description_content"]"#,
        ".question-content",
        ".content__u3I1",
        "#description",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

/// Which page layout to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Codeforces,
    LeetCode,
    Generic,
}

impl PageKind {
    /// An explicit `source` field wins; otherwise the URL decides.
    pub fn of(problem: &Problem) -> Self {
        match problem.extra.get("source").and_then(|s| s.as_str()) {
            Some("codeforces") => return PageKind::Codeforces,
            Some("leetcode") => return PageKind::LeetCode,
            _ => {}
        }
        let url = problem.url.to_ascii_lowercase();
        if url.contains("codeforces.com") {
            PageKind::Codeforces
        } else if problem.platform() == Platform::LeetCode {
            PageKind::LeetCode
        } else {
            PageKind::Generic
        }
    }
}

/// Pull the statement text out of a problem page, whitespace collapsed.
pub fn extract_statement(kind: PageKind, html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let text = match kind {
        PageKind::Codeforces => codeforces(&doc),
        PageKind::LeetCode => leetcode(&doc),
        PageKind::Generic => generic(&doc),
    }?;
    (!text.is_empty()).then_some(text)
}

fn codeforces(doc: &Html) -> Option<String> {
    let node = doc.select(&PROBLEM_STATEMENT).next()?;
    // First block that reads like prose rather than the input/output/note sections.
    for div in node.select(&DIV) {
        let text = element_text(div);
        let lower = text.to_lowercase();
        if text.chars().count() > MIN_STATEMENT_CHARS
            && !["input", "output", "note"].iter().any(|w| lower.contains(w))
        {
            return Some(text);
        }
    }
    Some(element_text(node))
}

fn leetcode(doc: &Html) -> Option<String> {
    LEETCODE.iter().find_map(|sel| {
        let text = element_text(doc.select(sel).next()?);
        (text.chars().count() >= MIN_STATEMENT_CHARS).then_some(text)
    })
}

fn generic(doc: &Html) -> Option<String> {
    let body = doc.select(&BODY).next()?;
    Some(element_text(body).chars().take(GENERIC_MAX_CHARS).collect())
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(s: &str) -> String { s.split_whitespace().collect::<Vec<_>>().join(" ") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codeforces_skips_io_sections() {
        let html = r#"<html><body><div class="problem-statement">
            <div class="header"><div class="title">A. Watermelon</div></div>
            <div><p>One hot summer day Pete and his friend
               Billy decided to buy a watermelon.</p></div>
            <div class="input-specification">The first (and the only) input line contains integer w</div>
        </div></body></html>"#;
        let text = extract_statement(PageKind::Codeforces, html).unwrap();
        assert_eq!(text, "One hot summer day Pete and his friend Billy decided to buy a watermelon.");
    }

    #[test]
    fn codeforces_falls_back_to_whole_statement() {
        let html = r#"<div class="problem-statement"><div>short</div><div>Input: n</div></div>"#;
        assert_eq!(extract_statement(PageKind::Codeforces, html).unwrap(), "short Input: n");
        assert!(extract_statement(PageKind::Codeforces, "<p>no statement</p>").is_none());
    }

    #[test]
    fn leetcode_tries_selectors_in_order() {
        let html = r#"<div id="description">too short</div>
            <div class="question-content"><p>Given an array of integers nums and an integer target.</p></div>"#;
        assert_eq!(
            extract_statement(PageKind::LeetCode, html).unwrap(),
            "Given an array of integers nums and an integer target."
        );
        assert!(extract_statement(PageKind::LeetCode, r#"<div id="description">tiny</div>"#).is_none());
    }

    #[test]
    fn generic_takes_body_text() {
        let long = "word ".repeat(1000);
        let html = format!("<html><body><h1>Title</h1>\n<p>{long}</p></body></html>");
        let text = extract_statement(PageKind::Generic, &html).unwrap();
        assert!(text.starts_with("Title word word"));
        assert_eq!(text.chars().count(), GENERIC_MAX_CHARS);
    }

    #[test]
    fn page_kind_prefers_source_field() {
        let mut p = Problem::new("A", None, "https://mirror.example.com/p/1");
        assert_eq!(PageKind::of(&p), PageKind::Generic);
        p.extra.insert("source".into(), "codeforces".into());
        assert_eq!(PageKind::of(&p), PageKind::Codeforces);
        let lc = Problem::new("B", None, "https://leetcode.com/problems/two-sum/");
        assert_eq!(PageKind::of(&lc), PageKind::LeetCode);
    }
}
