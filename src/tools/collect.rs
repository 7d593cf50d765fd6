//! Scroll-driven incremental collection for list-type pages.
//!
//! One generic loop serves both search results and profile video lists:
//! scroll to the bottom, wait for lazy content, stop when the scroll extent
//! stops growing, extract whatever is rendered, and merge new records into a
//! per-call workspace with whole-record dedup. Errors inside one iteration
//! are logged and treated as zero yield; only setup failures abort the run.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::core::config;
use crate::core::error::HarvestError;
use crate::core::tasks::{CancelToken, TaskRegistry};
use crate::core::types::{SearchType, UserRecord, VideoRecord};
use crate::core::AppState;
use crate::extract;
use crate::scraping::{urls, BrowserSession};

/// Outcome of one scroll-collection run. `cancelled` distinguishes a
/// cooperative stop from normal exhaustion; the records gathered so far are
/// kept either way.
pub struct ScrollRun<T> {
    pub records: Vec<T>,
    pub cancelled: bool,
}

/// Merge `fresh` into the accumulation, skipping exact duplicates
/// (whole-record equality) and preserving discovery order. Returns how many
/// records were new.
pub fn merge_new<T: Clone + Eq + Hash>(
    seen: &mut HashSet<T>,
    records: &mut Vec<T>,
    fresh: Vec<T>,
) -> usize {
    let mut added = 0;
    for record in fresh {
        if seen.insert(record.clone()) {
            records.push(record);
            added += 1;
        }
    }
    added
}

/// The generic scroll/wait/extract/merge loop.
///
/// Runs at most `scroll_count` iterations; stops early when the scroll
/// extent is unchanged between two consecutive iterations (end of list) or
/// when `cancel` is observed at an iteration boundary. Progress and running
/// counts are reported into the owning task.
pub async fn scroll_collect<T, F>(
    session: &BrowserSession,
    scroll_count: u32,
    delay: Duration,
    registry: &TaskRegistry,
    task_id: &str,
    cancel: &CancelToken,
    extract_fn: F,
) -> Result<ScrollRun<T>, HarvestError>
where
    T: Clone + Eq + Hash,
    F: Fn(&str) -> Vec<T>,
{
    let mut seen: HashSet<T> = HashSet::new();
    let mut records: Vec<T> = Vec::new();
    let mut last_extent = session.scroll_height().await?;
    let log_every = (scroll_count / 10).max(1);

    for i in 0..scroll_count {
        if cancel.is_cancelled() {
            warn!(
                "[collect] task={} stopped at iteration {}/{}",
                task_id, i, scroll_count
            );
            return Ok(ScrollRun {
                records,
                cancelled: true,
            });
        }

        if let Err(e) = session.scroll_to_bottom().await {
            error!("[collect] scroll error: {}", e);
            continue;
        }
        tokio::time::sleep(delay).await;

        match session.scroll_height().await {
            Ok(extent) => {
                if extent == last_extent {
                    info!("[collect] task={} reached end of list", task_id);
                    break;
                }
                last_extent = extent;
            }
            Err(e) => {
                error!("[collect] extent read error: {}", e);
                continue;
            }
        }

        let html = match session.html().await {
            Ok(html) => html,
            Err(e) => {
                error!("[collect] markup read error: {}", e);
                continue;
            }
        };

        let added = merge_new(&mut seen, &mut records, extract_fn(&html));

        let progress = ((i + 1) as f32 / scroll_count as f32) * 100.0;
        let collected = records.len();
        registry.update(task_id, |t| {
            t.progress = progress;
            t.collected_count = collected;
            t.message = format!("scrolling ({}/{})", i + 1, scroll_count);
        });
        if (i + 1) % log_every == 0 {
            info!(
                "[collect] task={} progress={:.1}% collected={} (added={})",
                task_id, progress, collected, added
            );
        }
    }

    Ok(ScrollRun {
        records,
        cancelled: false,
    })
}

/// Collect video cards for a keyword search. Owns the session and the task's
/// terminal status; publishes the result to the shared snapshot on success.
pub async fn collect_search_videos(
    state: &Arc<AppState>,
    keyword: &str,
    scroll_count: u32,
    delay: Duration,
    task_id: &str,
    cancel: &CancelToken,
) -> Result<ScrollRun<VideoRecord>, HarvestError> {
    let url = urls::search_url(keyword, SearchType::Video);
    info!(
        "[collect] task={} keyword={:?} type=video scroll_count={} url={}",
        task_id, keyword, scroll_count, url
    );

    let run = run_collection(state, &url, scroll_count, delay, task_id, cancel, |html| {
        extract::video::extract_search_videos(html)
    })
    .await?;

    state.store_videos(run.records.clone());
    finish_task(state, task_id, &run);
    Ok(run)
}

/// Collect user cards for a keyword search.
pub async fn collect_search_users(
    state: &Arc<AppState>,
    keyword: &str,
    scroll_count: u32,
    delay: Duration,
    task_id: &str,
    cancel: &CancelToken,
) -> Result<ScrollRun<UserRecord>, HarvestError> {
    let url = urls::search_url(keyword, SearchType::User);
    info!(
        "[collect] task={} keyword={:?} type=user scroll_count={} url={}",
        task_id, keyword, scroll_count, url
    );

    let run = run_collection(state, &url, scroll_count, delay, task_id, cancel, |html| {
        extract::user::extract_users(html)
    })
    .await?;

    state.store_users(run.records.clone());
    finish_task(state, task_id, &run);
    Ok(run)
}

/// Enumerate every video on a user's profile page. Unlike search collection
/// this does not replace the shared snapshot — the caller owns the result.
pub async fn collect_user_videos(
    state: &Arc<AppState>,
    user_input: &str,
    scroll_count: u32,
    delay: Duration,
    task_id: &str,
    cancel: &CancelToken,
) -> Result<ScrollRun<VideoRecord>, HarvestError> {
    let url = urls::profile_url(user_input);
    info!(
        "[user] task={} collecting videos for user={:?} url={}",
        task_id, user_input, url
    );

    let run = run_collection(state, &url, scroll_count, delay, task_id, cancel, |html| {
        extract::video::extract_videos(html)
    })
    .await?;

    finish_task(state, task_id, &run);
    info!("[user] task={} done collected={}", task_id, run.records.len());
    Ok(run)
}

/// Shared session lifecycle: launch, navigate, scroll-collect, close on every
/// exit path. Setup failures (launch, navigation, first extent read) are
/// recorded as the task's failure and propagated.
async fn run_collection<T, F>(
    state: &Arc<AppState>,
    url: &str,
    scroll_count: u32,
    delay: Duration,
    task_id: &str,
    cancel: &CancelToken,
    extract_fn: F,
) -> Result<ScrollRun<T>, HarvestError>
where
    T: Clone + Eq + Hash,
    F: Fn(&str) -> Vec<T>,
{
    let mut session = match BrowserSession::launch().await {
        Ok(s) => s,
        Err(e) => {
            error!("[collect] task={} session init failed: {}", task_id, e);
            state.tasks.fail(task_id, &format!("collection failed: {}", e));
            return Err(e);
        }
    };

    let result = async {
        session.open(url, config::nav_settle()).await?;
        scroll_collect(
            &session,
            scroll_count,
            delay,
            &state.tasks,
            task_id,
            cancel,
            extract_fn,
        )
        .await
    }
    .await;

    session.close().await;

    match result {
        Ok(run) => Ok(run),
        Err(e) => {
            error!("[collect] task={} failed: {}", task_id, e);
            state.tasks.fail(task_id, &format!("collection failed: {}", e));
            Err(e)
        }
    }
}

fn finish_task<T>(state: &Arc<AppState>, task_id: &str, run: &ScrollRun<T>) {
    if run.cancelled {
        state.tasks.mark_stopped(task_id, run.records.len());
    } else {
        state.tasks.complete(task_id, run.records.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_skips_exact_duplicates_and_keeps_order() {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        let added = merge_new(&mut seen, &mut records, vec!["a", "b", "a"]);
        assert_eq!(added, 2);
        assert_eq!(records, vec!["a", "b"]);

        // Feeding the same batch again yields nothing new.
        let added = merge_new(&mut seen, &mut records, vec!["a", "b"]);
        assert_eq!(added, 0);
        assert_eq!(records, vec!["a", "b"]);

        let added = merge_new(&mut seen, &mut records, vec!["c"]);
        assert_eq!(added, 1);
        assert_eq!(records, vec!["a", "b", "c"]);
    }

    #[test]
    fn records_differing_in_one_field_are_both_kept() {
        use crate::core::types::VideoRecord;

        let base = VideoRecord {
            video_url: "/video/1".to_string(),
            cover_image: String::new(),
            title: "t".to_string(),
            author: "a".to_string(),
            publish_time: String::new(),
            likes: "10".to_string(),
            comment_count: None,
        };
        let mut with_count = base.clone();
        with_count.comment_count = Some(3);

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let added = merge_new(&mut seen, &mut records, vec![base, with_count]);
        assert_eq!(added, 2);
        assert_eq!(records.len(), 2);
    }
}
