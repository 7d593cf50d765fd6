//! URL normalization and canonical detail-page resolution.
//!
//! Collected cards carry links in four shapes: absolute, protocol-relative
//! (`//…`), root-relative (`/…`), and bare path segments. `normalize` maps
//! all of them onto the canonical origin and is idempotent. Search-result and
//! popup links additionally redirect client-side to the real `/video/` page;
//! `resolve_canonical` follows that redirection inside a live page.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tracing::info;
use url::Url;

use crate::core::config;
use crate::core::error::HarvestError;
use crate::core::types::SearchType;
use crate::scraping::BrowserSession;

pub const PLATFORM_ORIGIN: &str = "https://www.douyin.com";

/// Convert a collected link to canonical absolute form. Idempotent.
pub fn normalize(url: &str) -> String {
    if url.is_empty() || url.starts_with("http") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    if url.starts_with('/') {
        return format!("{}{}", PLATFORM_ORIGIN, url);
    }
    format!("{}/{}", PLATFORM_ORIGIN, url)
}

/// `true` when `url` already has the canonical detail-page shape.
pub fn is_video_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().contains("/video/"),
        // Relative link — fall back to a substring check.
        Err(_) => url.contains("/video/"),
    }
}

/// Search page for `keyword`, video or user mode.
pub fn search_url(keyword: &str, search_type: SearchType) -> String {
    let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
    format!(
        "{}/search/{}?source=normal_search&type={}",
        PLATFORM_ORIGIN,
        encoded,
        search_type.as_str()
    )
}

/// Profile URL for a user identifier: absolute URLs pass through, anything
/// else is treated as a handle (leading `@` stripped).
pub fn profile_url(user_input: &str) -> String {
    let trimmed = user_input.trim();
    if trimmed.starts_with("http") {
        return trimmed.to_string();
    }
    format!("{}/user/{}", PLATFORM_ORIGIN, trimmed.trim_start_matches('@'))
}

/// Resolve a search-result or popup link to the canonical detail-page URL.
///
/// Detail-page URLs return immediately without touching a browser. Anything
/// else is opened in a fresh session; after the redirect settles we read the
/// final `location.href`. Browser failures propagate as `Resolution`.
pub async fn resolve_canonical(url: &str) -> Result<String, HarvestError> {
    if is_video_url(url) {
        let norm = normalize(url);
        info!("[resolve] already a video url -> {}", norm);
        return Ok(norm);
    }

    let mut session = BrowserSession::launch().await?;
    let result = follow_redirect(&session, url, config::nav_settle()).await;
    session.close().await;

    result.map_err(|e| HarvestError::Resolution {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

async fn follow_redirect(
    session: &BrowserSession,
    url: &str,
    settle: Duration,
) -> Result<String, HarvestError> {
    info!("[resolve] opening url: {}", url);
    session.open(url, settle).await?;

    let mut final_url = session
        .eval("location.href")
        .await?
        .as_str()
        .map(str::to_string)
        .unwrap_or_default();
    if final_url.is_empty() {
        final_url = session.current_url().await.unwrap_or_default();
    }
    if final_url.is_empty() {
        return Err(HarvestError::Extraction(
            "page reported no final location".to_string(),
        ));
    }

    let norm = normalize(&final_url);
    info!("[resolve] final url -> {}", norm);
    Ok(norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_covers_all_link_shapes() {
        assert_eq!(
            normalize("https://www.douyin.com/video/123"),
            "https://www.douyin.com/video/123"
        );
        assert_eq!(
            normalize("//www.douyin.com/video/123"),
            "https://www.douyin.com/video/123"
        );
        assert_eq!(
            normalize("/video/123"),
            "https://www.douyin.com/video/123"
        );
        assert_eq!(
            normalize("video/123"),
            "https://www.douyin.com/video/123"
        );
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["https://www.douyin.com/video/1", "//host/p", "/video/1", "discover"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn video_url_shape_detection() {
        assert!(is_video_url("https://www.douyin.com/video/7001"));
        assert!(is_video_url("/video/7001"));
        assert!(!is_video_url("https://www.douyin.com/discover?x=1"));
        // `/video/` in the query string is not a detail page.
        assert!(!is_video_url("https://www.douyin.com/search/a?from=/video/1"));
    }

    #[test]
    fn search_url_percent_encodes_keyword() {
        let url = search_url("美食 vlog", SearchType::Video);
        assert!(url.starts_with("https://www.douyin.com/search/"));
        assert!(url.ends_with("?source=normal_search&type=video"));
        assert!(!url.contains(' '));

        let user_mode = search_url("cat", SearchType::User);
        assert!(user_mode.ends_with("type=user"));
    }

    #[test]
    fn profile_url_handles_all_input_forms() {
        assert_eq!(
            profile_url("https://www.douyin.com/user/abc"),
            "https://www.douyin.com/user/abc"
        );
        assert_eq!(profile_url("@handle"), "https://www.douyin.com/user/handle");
        assert_eq!(profile_url("MS4wLjAB"), "https://www.douyin.com/user/MS4wLjAB");
    }
}
