//! Multi-stage harvesting pipelines.
//!
//! Keyword pipeline: search → rank by likes → resolve → harvest comments per
//! video → aggregate. User pipeline: profile → enumerate videos → resolve →
//! harvest → aggregate, no ranking. Both are best-effort accumulate: only
//! the initial enumeration stage is fatal; any single video's resolution or
//! harvest failure skips that video and the pipeline continues.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::error::HarvestError;
use crate::core::types::{KeywordCommentRequest, UserCommentRequest, VideoRecord};
use crate::core::AppState;
use crate::scraping::urls;
use crate::tools::collect;
use crate::tools::comments::CommentHarvester;

/// Aggregate pipeline output: how many videos were processed and every
/// harvested comment in per-video processing order.
pub struct CommentBatch {
    pub video_count: usize,
    pub comments: Vec<String>,
}

impl CommentBatch {
    fn empty() -> Self {
        Self {
            video_count: 0,
            comments: Vec::new(),
        }
    }
}

/// Parse the platform's raw like-count format to a number: a trailing "万"
/// multiplies by 10 000, anything unparsable counts as 0.
pub fn parse_like_count(likes: &str) -> u64 {
    let s = likes.trim();
    if s.is_empty() {
        return 0;
    }
    if let Some(stripped) = s.strip_suffix('万') {
        return stripped
            .trim()
            .parse::<f64>()
            .map(|n| (n * 10_000.0) as u64)
            .unwrap_or(0);
    }
    s.parse::<f64>().map(|n| n as u64).unwrap_or(0)
}

/// Stable descending sort by parsed like count (ties keep discovery order),
/// truncated to the top `max_videos`.
pub fn rank_videos(mut videos: Vec<VideoRecord>, max_videos: usize) -> Vec<VideoRecord> {
    videos.sort_by(|a, b| parse_like_count(&b.likes).cmp(&parse_like_count(&a.likes)));
    videos.truncate(max_videos);
    videos
}

/// Keyword pipeline: collect search videos, pick the hottest, harvest each.
pub async fn comments_by_keyword(
    state: &Arc<AppState>,
    req: &KeywordCommentRequest,
) -> Result<CommentBatch, HarvestError> {
    info!(
        "[keyword] keyword={:?} max_videos={} per_video_limit={} scroll_count={} delay={}",
        req.keyword, req.max_videos, req.per_video_limit, req.scroll_count, req.delay
    );

    let (task_id, cancel) = state.tasks.register("keyword");
    let run = collect::collect_search_videos(
        state,
        &req.keyword,
        req.scroll_count,
        Duration::from_secs_f64(req.delay),
        &task_id,
        &cancel,
    )
    .await?;

    if run.records.is_empty() {
        warn!("[keyword] no videos collected for keyword={:?}", req.keyword);
        return Ok(CommentBatch::empty());
    }

    let mut selected = rank_videos(run.records, req.max_videos);
    for (idx, video) in selected.iter().take(10).enumerate() {
        info!(
            "[keyword] top#{} likes={} title={:?} url={}",
            idx + 1,
            video.likes,
            video.title,
            urls::normalize(&video.video_url)
        );
    }

    let comments = harvest_each(state, &mut selected, req.per_video_limit).await;
    info!(
        "[keyword] done keyword={:?} videos_used={} total_comments={}",
        req.keyword,
        selected.len(),
        comments.len()
    );

    Ok(CommentBatch {
        video_count: selected.len(),
        comments,
    })
}

/// User pipeline: enumerate every video on the profile, harvest each.
pub async fn comments_by_user(
    state: &Arc<AppState>,
    req: &UserCommentRequest,
) -> Result<CommentBatch, HarvestError> {
    info!(
        "[user] user_input={:?} per_video_limit={} scroll_count={} delay={}",
        req.user_input, req.per_video_limit, req.scroll_count, req.delay
    );

    let (task_id, cancel) = state.tasks.register("user");
    let run = collect::collect_user_videos(
        state,
        &req.user_input,
        req.scroll_count,
        Duration::from_secs_f64(req.delay),
        &task_id,
        &cancel,
    )
    .await?;

    if run.records.is_empty() {
        warn!("[user] no videos found for user={:?}", req.user_input);
        return Ok(CommentBatch::empty());
    }

    let mut videos = run.records;
    let comments = harvest_each(state, &mut videos, req.per_video_limit).await;
    info!(
        "[user] done user={:?} videos_used={} total_comments={}",
        req.user_input,
        videos.len(),
        comments.len()
    );

    Ok(CommentBatch {
        video_count: videos.len(),
        comments,
    })
}

/// Resolve and harvest each video in order, recording the harvested count
/// back onto the record. A failure on one video skips it.
async fn harvest_each(
    state: &Arc<AppState>,
    videos: &mut [VideoRecord],
    per_video_limit: usize,
) -> Vec<String> {
    let harvester = CommentHarvester::default();
    let mut all_comments = Vec::new();

    for video in videos.iter_mut() {
        let full_url = urls::normalize(&video.video_url);
        let full_url = if urls::is_video_url(&full_url) {
            full_url
        } else {
            match urls::resolve_canonical(&full_url).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("[pipeline] video url resolution failed, skipping: {}", e);
                    continue;
                }
            }
        };

        info!("[pipeline] fetching comments for {}", full_url);
        match harvester.fetch_comments(&full_url, per_video_limit).await {
            Ok(comments) => {
                video.comment_count = Some(comments.len());
                state.record_comment_count(&full_url, comments.len());
                info!(
                    "[pipeline] comments_ok url={} count={} total={}",
                    full_url,
                    comments.len(),
                    all_comments.len() + comments.len()
                );
                all_comments.extend(comments);
            }
            Err(e) => {
                warn!(
                    "[pipeline] comment harvest failed for {}, skipping: {}",
                    full_url, e
                );
                continue;
            }
        }
    }

    all_comments
}
