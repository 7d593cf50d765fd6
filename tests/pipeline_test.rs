/// Pipeline-level behavior that can be exercised without a browser:
/// ranking/selection, accumulation semantics, and task lifecycle.
use douyin_scout::{collect, pipeline, AppState, TaskStatus, VideoRecord};

fn video(url: &str, likes: &str) -> VideoRecord {
    VideoRecord {
        video_url: url.to_string(),
        cover_image: String::new(),
        title: format!("video {}", url),
        author: "作者".to_string(),
        publish_time: String::new(),
        likes: likes.to_string(),
        comment_count: None,
    }
}

#[test]
fn keyword_selection_picks_hottest_two_in_rank_order() {
    // Parsed like values: 10000, 5000, 20000, 1000.
    let collected = vec![
        video("/video/a", "1万"),
        video("/video/b", "5000"),
        video("/video/c", "2万"),
        video("/video/d", "1000"),
    ];

    let selected = pipeline::rank_videos(collected, 2);
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0].video_url, "/video/c");
    assert_eq!(selected[1].video_url, "/video/a");
}

#[test]
fn accumulation_is_whole_record_dedup() {
    use std::collections::HashSet;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    let a = video("/video/a", "10");
    let added = collect::merge_new(&mut seen, &mut records, vec![a.clone(), a.clone()]);
    assert_eq!(added, 1);

    // A re-render with a changed stat is a different record on purpose.
    let mut restat = a.clone();
    restat.likes = "11".to_string();
    let added = collect::merge_new(&mut seen, &mut records, vec![restat]);
    assert_eq!(added, 1);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn stop_is_visible_to_the_owning_loop_and_pollers() {
    let state = AppState::new();
    let (task_id, cancel) = state.tasks.register("task");

    // Simulate the loop's iteration boundary: stop arrives, the token trips,
    // the loop records its terminal status.
    state.tasks.stop(&task_id);
    assert!(cancel.is_cancelled());

    state.tasks.mark_stopped(&task_id, 17);
    let task = state.tasks.get(&task_id).expect("task still visible");
    assert_eq!(task.status, TaskStatus::Stopped);
    assert_eq!(task.collected_count, 17);
}

#[test]
fn unknown_task_id_is_not_found() {
    let state = AppState::new();
    assert!(state.tasks.get("task_20990101_000000_000000").is_none());
}
