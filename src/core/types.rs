use serde::{Deserialize, Serialize};

// ── Records ──────────────────────────────────────────────────────────────────

/// One video card as extracted from rendered markup.
///
/// Dedup identity is whole-record equality: the accumulation set compares
/// every field, so the same video re-rendered with a changed stat is kept as
/// a second record. `comment_count` is only populated after a harvest pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_url: String,
    pub cover_image: String,
    pub title: String,
    pub author: String,
    pub publish_time: String,
    /// Raw platform format, e.g. "1.2万" or "834".
    pub likes: String,
    // Kept unskipped so CSV export sees a fixed column set.
    #[serde(default)]
    pub comment_count: Option<usize>,
}

/// One user card from a user-type search. Same whole-record dedup rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRecord {
    pub title: String,
    /// Platform handle; empty when the stats block did not carry one.
    pub douyin_id: String,
    pub likes: String,
    pub followers: String,
    pub description: String,
    pub avatar_url: String,
    pub user_link: String,
}

/// A harvested comment body — free text, no metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment: String,
}

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Video,
    User,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Video => "video",
            SearchType::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Video,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Interaction,
    ContentLength,
    Keywords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    #[serde(default)]
    pub search_type: SearchType,
    #[serde(default = "default_search_scrolls")]
    pub scroll_count: u32,
    #[serde(default = "default_delay")]
    pub delay: f64,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_keyword(&self.keyword)?;
        validate_scroll_count(self.scroll_count, 1000)?;
        validate_delay(self.delay)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentRequest {
    pub video_url: String,
    #[serde(default = "default_per_video_limit")]
    pub limit: usize,
}

impl CommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.video_url.trim().is_empty() {
            return Err("video_url must not be empty".to_string());
        }
        validate_limit(self.limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeywordCommentRequest {
    pub keyword: String,
    #[serde(default = "default_keyword_scrolls")]
    pub scroll_count: u32,
    #[serde(default = "default_delay")]
    pub delay: f64,
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,
    #[serde(default = "default_per_video_limit")]
    pub per_video_limit: usize,
}

impl KeywordCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_keyword(&self.keyword)?;
        validate_scroll_count(self.scroll_count, 1000)?;
        validate_delay(self.delay)?;
        if !(1..=50).contains(&self.max_videos) {
            return Err("max_videos must be in 1..=50".to_string());
        }
        validate_limit(self.per_video_limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserCommentRequest {
    pub user_input: String,
    #[serde(default = "default_per_video_limit")]
    pub per_video_limit: usize,
    #[serde(default = "default_search_scrolls")]
    pub scroll_count: u32,
    #[serde(default = "default_delay")]
    pub delay: f64,
}

impl UserCommentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.user_input.trim().is_empty() {
            return Err("user_input must not be empty".to_string());
        }
        validate_scroll_count(self.scroll_count, 500)?;
        validate_delay(self.delay)?;
        validate_limit(self.per_video_limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub data_type: DataType,
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub format: ExportFormat,
}

fn default_search_scrolls() -> u32 {
    100
}
fn default_keyword_scrolls() -> u32 {
    80
}
fn default_delay() -> f64 {
    2.0
}
fn default_max_videos() -> usize {
    10
}
fn default_per_video_limit() -> usize {
    50
}

fn validate_keyword(keyword: &str) -> Result<(), String> {
    if keyword.trim().is_empty() {
        return Err("keyword must not be empty".to_string());
    }
    Ok(())
}

fn validate_scroll_count(count: u32, max: u32) -> Result<(), String> {
    if count < 1 || count > max {
        return Err(format!("scroll_count must be in 1..={}", max));
    }
    Ok(())
}

fn validate_delay(delay: f64) -> Result<(), String> {
    if !(0.5..=10.0).contains(&delay) {
        return Err("delay must be in 0.5..=10.0 seconds".to_string());
    }
    Ok(())
}

fn validate_limit(limit: usize) -> Result<(), String> {
    if !(1..=500).contains(&limit) {
        return Err("comment limit must be in 1..=500".to_string());
    }
    Ok(())
}

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub features: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StartCollectionResponse {
    pub success: bool,
    pub task_id: String,
    pub message: String,
    pub status_url: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionStatusResponse {
    pub task_id: String,
    pub status: crate::core::tasks::TaskStatus,
    pub progress: f32,
    pub collected_count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct VideoCommentsResponse {
    pub success: bool,
    pub video_url: String,
    pub count: usize,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Serialize)]
pub struct KeywordCommentsResponse {
    pub success: bool,
    pub keyword: String,
    pub video_count: usize,
    pub comment_count: usize,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Serialize)]
pub struct UserCommentsResponse {
    pub success: bool,
    pub user_input: String,
    pub video_count: usize,
    pub comment_count: usize,
    pub comments: Vec<CommentRecord>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    pub path: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_record_dedup_semantics() {
        use std::collections::HashSet;

        let video = VideoRecord {
            video_url: "/video/123".to_string(),
            cover_image: "https://p.example/c.jpg".to_string(),
            title: "标题".to_string(),
            author: "作者".to_string(),
            publish_time: "2024-01-01".to_string(),
            likes: "834".to_string(),
            comment_count: None,
        };

        let mut set = HashSet::new();
        set.insert(video.clone());
        set.insert(video.clone());
        assert_eq!(set.len(), 1);

        // Differing only in comment_count is a distinct record by design.
        let mut counted = video.clone();
        counted.comment_count = Some(7);
        set.insert(counted);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn request_bounds_are_enforced() {
        let ok = SearchRequest {
            keyword: "猫".to_string(),
            search_type: SearchType::Video,
            scroll_count: 100,
            delay: 2.0,
        };
        assert!(ok.validate().is_ok());

        let bad_delay = SearchRequest { delay: 0.1, ..ok };
        assert!(bad_delay.validate().is_err());

        let bad_scrolls = SearchRequest {
            keyword: "猫".to_string(),
            search_type: SearchType::Video,
            scroll_count: 1001,
            delay: 2.0,
        };
        assert!(bad_scrolls.validate().is_err());
    }

    #[test]
    fn search_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SearchType::User).unwrap(), "\"user\"");
        let parsed: AnalysisType = serde_json::from_str("\"content_length\"").unwrap();
        assert_eq!(parsed, AnalysisType::ContentLength);
    }
}
