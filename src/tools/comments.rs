//! Comment harvesting for a single video.
//!
//! Distinct from the list collector: the comment panel is a nested scrollable
//! region, so the outer page's extent keeps growing from unrelated content
//! below it. Termination is therefore stagnation-based — three consecutive
//! iterations with no new comment mean the end has been reached.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::core::config;
use crate::core::error::HarvestError;
use crate::extract::comment::extract_comments;
use crate::scraping::BrowserSession;

const COMMENT_TAB_LABEL: &str = "评论";
const STAGNATION_LIMIT: u32 = 3;

// Scroll the nested comment list when the DOM has one, else the whole page.
const SCROLL_COMMENT_PANEL_JS: &str = r#"
    const panel = document.querySelector('[data-e2e="comment-list"], .comment-list, [class*="CommentList"]');
    if (panel) {
        panel.scrollTop = panel.scrollHeight;
    } else {
        window.scrollTo(0, document.body.scrollHeight);
    }
"#;

/// Counts consecutive zero-yield iterations; trips after the configured run
/// of stagnant rounds. Any yield resets it.
pub struct StagnationGuard {
    misses: u32,
    limit: u32,
}

impl StagnationGuard {
    pub fn new(limit: u32) -> Self {
        Self { misses: 0, limit }
    }

    /// Record one iteration's yield; returns `true` when the loop should stop.
    pub fn observe(&mut self, added: usize) -> bool {
        if added == 0 {
            self.misses += 1;
            self.misses >= self.limit
        } else {
            self.misses = 0;
            false
        }
    }
}

pub struct CommentHarvester {
    max_scrolls: u32,
}

impl Default for CommentHarvester {
    fn default() -> Self {
        Self {
            max_scrolls: config::max_comment_scrolls(),
        }
    }
}

impl CommentHarvester {
    pub fn new(max_scrolls: u32) -> Self {
        Self { max_scrolls }
    }

    /// Harvest up to `limit` unique comments from `video_url`, in discovery
    /// order. Opens its own session and closes it on every exit path.
    pub async fn fetch_comments(
        &self,
        video_url: &str,
        limit: usize,
    ) -> Result<Vec<String>, HarvestError> {
        let mut session = BrowserSession::launch().await?;
        let result = self.harvest(&session, video_url, limit).await;
        session.close().await;
        result
    }

    async fn harvest(
        &self,
        session: &BrowserSession,
        video_url: &str,
        limit: usize,
    ) -> Result<Vec<String>, HarvestError> {
        info!("[comments] opening video: {} limit={}", video_url, limit);
        session.open(video_url, config::video_settle()).await?;

        // Best-effort reveal of the comment panel; absence is fine, the
        // panel may already be open.
        if session.click_text(COMMENT_TAB_LABEL).await {
            info!("[comments] clicked comment tab");
            tokio::time::sleep(config::comment_tab_settle()).await;
        } else {
            debug!("[comments] no comment tab found or already open");
        }

        let mut comments: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stagnation = StagnationGuard::new(STAGNATION_LIMIT);

        for scroll_idx in 0..self.max_scrolls {
            if comments.len() >= limit {
                info!("[comments] reached limit: {}/{}", comments.len(), limit);
                break;
            }

            let html = session.html().await?;
            let fresh = extract_comments(&html);

            let mut added = 0;
            for comment in fresh {
                if comments.len() >= limit {
                    break;
                }
                if seen.insert(comment.clone()) {
                    comments.push(comment);
                    added += 1;
                }
            }

            if stagnation.observe(added) {
                info!(
                    "[comments] no new comments for {} scrolls, stopping",
                    STAGNATION_LIMIT
                );
                break;
            }

            info!(
                "[comments] scroll={} collected={}/{} (added={})",
                scroll_idx + 1,
                comments.len(),
                limit,
                added
            );

            if let Err(e) = session.eval(SCROLL_COMMENT_PANEL_JS).await {
                tracing::warn!("[comments] panel scroll error (tolerated): {}", e);
            }
            tokio::time::sleep(config::comment_scroll_settle()).await;
        }

        comments.truncate(limit);
        info!("[comments] final result: {} comments", comments.len());
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_consecutive_misses_trip_the_guard() {
        let mut guard = StagnationGuard::new(3);
        assert!(!guard.observe(0));
        assert!(!guard.observe(0));
        assert!(guard.observe(0));
    }

    #[test]
    fn any_yield_resets_the_counter() {
        let mut guard = StagnationGuard::new(3);
        assert!(!guard.observe(0));
        assert!(!guard.observe(0));
        assert!(!guard.observe(5));
        assert!(!guard.observe(0));
        assert!(!guard.observe(0));
        assert!(guard.observe(0));
    }
}
