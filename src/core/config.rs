//! Environment-variable config with built-in defaults.
//!
//! The delays mirror the settle times the platform needs in practice: search
//! and profile pages render their first batch ~5s after navigation, a video
//! detail page needs ~8s before the comment panel exists, and the comment
//! list repopulates ~1.5s after each panel scroll.

use std::path::PathBuf;
use std::time::Duration;

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_NAV_SETTLE_MS: &str = "DOUYIN_SCOUT_NAV_SETTLE_MS";
pub const ENV_VIDEO_SETTLE_MS: &str = "DOUYIN_SCOUT_VIDEO_SETTLE_MS";
pub const ENV_COMMENT_TAB_SETTLE_MS: &str = "DOUYIN_SCOUT_COMMENT_TAB_SETTLE_MS";
pub const ENV_COMMENT_SCROLL_SETTLE_MS: &str = "DOUYIN_SCOUT_COMMENT_SCROLL_SETTLE_MS";
pub const ENV_MAX_COMMENT_SCROLLS: &str = "DOUYIN_SCOUT_MAX_COMMENT_SCROLLS";
pub const ENV_EXPORT_DIR: &str = "DOUYIN_SCOUT_EXPORT_DIR";

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Settle wait after navigating to a search or profile page.
pub fn nav_settle() -> Duration {
    Duration::from_millis(env_u64(ENV_NAV_SETTLE_MS, 5000))
}

/// Settle wait after navigating to a video detail page (the comment panel is
/// slower to hydrate than the list pages).
pub fn video_settle() -> Duration {
    Duration::from_millis(env_u64(ENV_VIDEO_SETTLE_MS, 8000))
}

/// Settle wait after clicking the comment tab.
pub fn comment_tab_settle() -> Duration {
    Duration::from_millis(env_u64(ENV_COMMENT_TAB_SETTLE_MS, 2000))
}

/// Settle wait after each comment-panel scroll.
pub fn comment_scroll_settle() -> Duration {
    Duration::from_millis(env_u64(ENV_COMMENT_SCROLL_SETTLE_MS, 1500))
}

/// Upper bound on comment-panel scroll iterations per video.
pub fn max_comment_scrolls() -> u32 {
    env_u64(ENV_MAX_COMMENT_SCROLLS, 30) as u32
}

/// Directory export files are written into.
pub fn export_dir() -> PathBuf {
    std::env::var(ENV_EXPORT_DIR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("exports"))
}
