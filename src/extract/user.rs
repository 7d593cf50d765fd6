//! User-card extraction from user-type search results.

use scraper::{Html, Selector};
use tracing::debug;

use super::{clean_text, element_text};
use crate::core::types::UserRecord;

// The stats block renders its spans in no fixed order; each child is
// classified by its label text rather than its position.
const HANDLE_MARKERS: [&str; 2] = ["抖音号:", "抖音号："];
const LIKES_MARKER: &str = "获赞";
const FOLLOWERS_MARKER: &str = "粉丝";

/// Extract all user cards from `html`. Cards without a title are dropped.
pub fn extract_users(html: &str) -> Vec<UserRecord> {
    let doc = Html::parse_document(html);

    let card_sel = Selector::parse("div.search-result-card > a.hY8lWHgA.poLTDMYS").unwrap();
    let title_sel = Selector::parse("div.XQwChAbX p.v9LWb7QE span span span span span").unwrap();
    let avatar_sel = Selector::parse("img.RlLOO79h").unwrap();
    let stats_sel = Selector::parse("div.jjebLXt0").unwrap();
    let span_sel = Selector::parse("span").unwrap();
    let desc_sel = Selector::parse("p.Kdb5Km3i span span span span span").unwrap();

    let mut records = Vec::new();
    for card in doc.select(&card_sel) {
        let title = card
            .select(&title_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let user_link = clean_text(card.value().attr("href").unwrap_or(""));
        let avatar_url = card
            .select(&avatar_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(clean_text)
            .unwrap_or_default();

        let mut douyin_id = String::new();
        let mut likes = "0".to_string();
        let mut followers = "0".to_string();

        if let Some(stats) = card.select(&stats_sel).next() {
            for span in stats.select(&span_sel) {
                let text = element_text(&span);
                if HANDLE_MARKERS.iter().any(|m| text.contains(m)) {
                    if let Some(inner) = span.select(&span_sel).next() {
                        douyin_id = element_text(&inner);
                    }
                } else if text.contains(LIKES_MARKER) {
                    likes = clean_text(&text.replace(LIKES_MARKER, ""));
                } else if text.contains(FOLLOWERS_MARKER) {
                    followers = clean_text(&text.replace(FOLLOWERS_MARKER, ""));
                }
            }
        }

        let description = card
            .select(&desc_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        records.push(UserRecord {
            title,
            douyin_id,
            likes,
            followers,
            description,
            avatar_url,
            user_link,
        });
    }

    debug!("[extract] {} user cards", records.len());
    records
}
