//! Video-card extraction from search-result and profile-page markup.

use scraper::{Html, Selector};
use tracing::debug;

use super::{clean_text, element_text};
use crate::core::types::VideoRecord;

const DEFAULT_TITLE: &str = "无标题";
const DEFAULT_AUTHOR: &str = "未知作者";

/// Extract all video cards from `html`.
///
/// A candidate without a link target is dropped — the link is the only field
/// that makes a record meaningful. Every other field falls back to a default.
pub fn extract_videos(html: &str) -> Vec<VideoRecord> {
    let doc = Html::parse_document(html);

    let item_sel = Selector::parse("li.SwZLHMKk").unwrap();
    let link_sel = Selector::parse("a.hY8lWHgA").unwrap();
    let img_sel = Selector::parse("img").unwrap();
    let title_sel = Selector::parse("div.VDYK8Xd7").unwrap();
    let author_sel = Selector::parse("span.MZNczJmS").unwrap();
    let time_sel = Selector::parse("span.faDtinfi").unwrap();
    let likes_sel = Selector::parse("span.cIiU4Muu").unwrap();

    let mut records = Vec::new();
    for item in doc.select(&item_sel) {
        let Some(link) = item.select(&link_sel).next() else {
            continue;
        };
        let video_url = clean_text(link.value().attr("href").unwrap_or(""));
        if video_url.is_empty() {
            continue;
        }

        let cover_image = item
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(clean_text)
            .unwrap_or_default();

        let title = item
            .select(&title_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let author = item
            .select(&author_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        let publish_time = item
            .select(&time_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        let likes = item
            .select(&likes_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "0".to_string());

        records.push(VideoRecord {
            video_url,
            cover_image,
            title,
            author,
            publish_time,
            likes,
            comment_count: None,
        });
    }

    debug!("[extract] {} video cards", records.len());
    records
}

/// Extract video cards scoped to the search page's scroll-list container.
/// Returns empty when the container is not in the markup yet.
pub fn extract_search_videos(html: &str) -> Vec<VideoRecord> {
    let doc = Html::parse_document(html);
    let container_sel = Selector::parse(r#"[data-e2e="scroll-list"]"#).unwrap();

    match doc.select(&container_sel).next() {
        Some(container) => extract_videos(&container.html()),
        None => {
            debug!("[extract] scroll-list container absent");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
        <ul>
          <li class="SwZLHMKk">
            <a class="hY8lWHgA" href="/video/7001"></a>
            <img src="//p3.example.com/cover1.jpg"/>
            <div class="VDYK8Xd7">第一支
视频</div>
            <span class="MZNczJmS">作者甲</span>
            <span class="faDtinfi">2024-03-01</span>
            <span class="cIiU4Muu">1.2万</span>
          </li>
          <li class="SwZLHMKk">
            <a class="hY8lWHgA" href="/video/7002"></a>
          </li>
          <li class="SwZLHMKk">
            <div class="VDYK8Xd7">没有链接的卡片</div>
          </li>
        </ul>"#;

    #[test]
    fn extracts_fields_and_applies_defaults() {
        let records = extract_videos(CARD);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.video_url, "/video/7001");
        assert_eq!(first.cover_image, "//p3.example.com/cover1.jpg");
        // Embedded newline collapsed to a single space.
        assert_eq!(first.title, "第一支 视频");
        assert_eq!(first.author, "作者甲");
        assert_eq!(first.publish_time, "2024-03-01");
        assert_eq!(first.likes, "1.2万");
        assert_eq!(first.comment_count, None);

        let bare = &records[1];
        assert_eq!(bare.title, "无标题");
        assert_eq!(bare.author, "未知作者");
        assert_eq!(bare.likes, "0");
    }

    #[test]
    fn card_without_link_is_dropped() {
        let records = extract_videos(CARD);
        assert!(records.iter().all(|r| !r.video_url.is_empty()));
    }

    #[test]
    fn search_extraction_is_scoped_to_scroll_list() {
        let inside = format!(r#"<div data-e2e="scroll-list">{}</div>"#, CARD);
        assert_eq!(extract_search_videos(&inside).len(), 2);

        // Cards outside the container do not count in search mode.
        assert!(extract_search_videos(CARD).is_empty());
    }
}
