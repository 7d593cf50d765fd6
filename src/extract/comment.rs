//! Comment-text extraction from a video page's comment panel.
//!
//! The panel mixes user-authored text with like counts, reply affordances,
//! and section headers, so extraction pairs a tiered selector cascade with a
//! noise predicate. The predicate is a heuristic tuned to the platform's
//! current UI copy, not a parser — expect the denylist to need revision when
//! that copy changes.

use aho_corasick::AhoCorasick;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use super::element_text;

/// Ordered most-specific-first. The first strategy that yields anything wins
/// exclusively — once a precise selector works, broader ones would only add
/// noise.
const COMMENT_SELECTORS: &[&str] = &[
    r#"span[data-e2e="comment-level-1"]"#,
    r#"div[data-e2e="comment-level-1"] span"#,
    r#"p[data-e2e="comment-detail"]"#,
    r#"div[data-e2e="comment-item"] span"#,
    r#"li[data-e2e="comment-item"] span"#,
    r#"div[class*="CommentItem"] span"#,
    r#"div[class*="comment-item"] span"#,
];

const FALLBACK_SELECTOR: &str =
    r#"div[class*="comment"], li[class*="comment"], span[class*="comment"]"#;

const NOISE_MARKERS: &[&str] = &["点赞", "回复", "条评论", "评论"];
const FALLBACK_NOISE_MARKERS: &[&str] = &["点赞", "回复", "条", "评论数"];

static NOISE_MATCHER: OnceLock<AhoCorasick> = OnceLock::new();
static FALLBACK_NOISE_MATCHER: OnceLock<AhoCorasick> = OnceLock::new();

fn noise_matcher() -> &'static AhoCorasick {
    NOISE_MATCHER.get_or_init(|| AhoCorasick::new(NOISE_MARKERS).expect("valid noise markers"))
}

fn fallback_noise_matcher() -> &'static AhoCorasick {
    FALLBACK_NOISE_MATCHER
        .get_or_init(|| AhoCorasick::new(FALLBACK_NOISE_MARKERS).expect("valid noise markers"))
}

/// `true` when `text` is UI chrome rather than a user-authored comment:
/// shorter than 2 characters, carrying a denylisted UI label, or purely
/// numeric (a like/reply counter).
pub fn is_noise(text: &str) -> bool {
    if text.chars().count() < 2 {
        return true;
    }
    if noise_matcher().is_match(text) {
        return true;
    }
    text.parse::<f64>().is_ok()
}

/// Extract unique comment bodies from `html`, in discovery order.
pub fn extract_comments(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut comments = Vec::new();
    let mut seen = HashSet::new();

    for css in COMMENT_SELECTORS {
        let Ok(sel) = Selector::parse(css) else {
            continue;
        };

        for el in doc.select(&sel) {
            let text = element_text(&el);
            if is_noise(&text) {
                continue;
            }
            if seen.insert(text.clone()) {
                comments.push(text);
            }
        }

        if !comments.is_empty() {
            debug!(
                "[extract] {} comments via selector {}",
                comments.len(),
                css
            );
            break;
        }
    }

    // All specific strategies came up empty — sweep broad class-name matches
    // with a stricter filter.
    if comments.is_empty() {
        debug!("[extract] no comments from specific selectors, trying fallback");
        if let Ok(sel) = Selector::parse(FALLBACK_SELECTOR) {
            for el in doc.select(&sel) {
                let text = element_text(&el);
                if text.chars().count() <= 5
                    || text.parse::<f64>().is_ok()
                    || fallback_noise_matcher().is_match(&text)
                {
                    continue;
                }
                if seen.insert(text.clone()) {
                    comments.push(text);
                }
            }
        }
    }

    debug!("[extract] total {} unique comments", comments.len());
    comments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_predicate_matches_documented_cases() {
        // Purely numeric counters.
        assert!(is_noise("12"));
        assert!(is_noise("3.4"));
        // UI labels.
        assert!(is_noise("点赞"));
        assert!(is_noise("回复"));
        assert!(is_noise("1869条评论"));
        // Under two characters.
        assert!(is_noise("好"));
        assert!(is_noise(""));
        // Real comment text survives.
        assert!(!is_noise("great video, thanks"));
        assert!(!is_noise("拍得太好了"));
    }

    #[test]
    fn first_matching_strategy_wins_exclusively() {
        let html = r#"
            <div>
              <span data-e2e="comment-level-1">博主说得对</span>
              <span data-e2e="comment-level-1">学到了很多</span>
              <div class="CommentItemWrap"><span>broad-selector noise</span></div>
            </div>"#;
        let comments = extract_comments(html);
        assert_eq!(comments, vec!["博主说得对", "学到了很多"]);
    }

    #[test]
    fn cascade_falls_through_to_broader_strategies() {
        // No data-e2e markers at all — the class-substring strategy catches it.
        let html = r#"
            <div class="CommentItemBox">
              <span>第一条评价内容不错</span>
              <span>13</span>
              <span>点赞</span>
            </div>"#;
        let comments = extract_comments(html);
        assert_eq!(comments, vec!["第一条评价内容不错"]);
    }

    #[test]
    fn counters_and_labels_are_filtered_out() {
        let html = r#"
            <div>
              <span data-e2e="comment-level-1">真的很实用的教程</span>
              <span data-e2e="comment-level-1">842</span>
              <span data-e2e="comment-level-1">点赞</span>
              <span data-e2e="comment-level-1">回复</span>
              <span data-e2e="comment-level-1">3.4</span>
            </div>"#;
        let comments = extract_comments(html);
        assert_eq!(comments, vec!["真的很实用的教程"]);
    }

    #[test]
    fn duplicates_collapse_within_one_extraction() {
        let html = r#"
            <div>
              <span data-e2e="comment-level-1">沙发</span>
              <span data-e2e="comment-level-1">沙发</span>
            </div>"#;
        assert_eq!(extract_comments(html).len(), 1);
    }

    #[test]
    fn fallback_uses_stricter_length_filter() {
        let html = r#"
            <div class="panel">
              <span class="comment-text">这个视频拍得真不错</span>
              <span class="comment-like">好看极了哦</span>
            </div>"#;
        // Five characters or fewer is dropped in fallback mode.
        let comments = extract_comments(html);
        assert_eq!(comments, vec!["这个视频拍得真不错"]);
    }
}
