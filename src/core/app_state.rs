use std::sync::RwLock;

use crate::core::tasks::TaskRegistry;
use crate::core::types::{UserRecord, VideoRecord};
use crate::scraping::urls;

/// Shared application state, one instance behind an `Arc` for all handlers.
///
/// The record snapshots hold the result of the most recent completed search
/// collection; collectors replace them wholesale when a run completes, the
/// data/analyze/export endpoints read them. Each collection call accumulates
/// into its own local workspace and only publishes here at the end, so
/// concurrent tasks never interleave through this state.
pub struct AppState {
    pub tasks: TaskRegistry,
    videos: RwLock<Vec<VideoRecord>>,
    users: RwLock<Vec<UserRecord>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tasks: TaskRegistry::new(),
            videos: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
        }
    }

    pub fn store_videos(&self, records: Vec<VideoRecord>) {
        *self.videos.write().expect("video snapshot lock poisoned") = records;
    }

    pub fn store_users(&self, records: Vec<UserRecord>) {
        *self.users.write().expect("user snapshot lock poisoned") = records;
    }

    pub fn videos_snapshot(&self) -> Vec<VideoRecord> {
        self.videos
            .read()
            .expect("video snapshot lock poisoned")
            .clone()
    }

    pub fn users_snapshot(&self) -> Vec<UserRecord> {
        self.users
            .read()
            .expect("user snapshot lock poisoned")
            .clone()
    }

    /// Record a harvested comment count onto every snapshot video whose
    /// normalized url matches `resolved_url`, so the data endpoints can sort
    /// by it.
    pub fn record_comment_count(&self, resolved_url: &str, count: usize) {
        let mut videos = self.videos.write().expect("video snapshot lock poisoned");
        for video in videos.iter_mut() {
            if urls::normalize(&video.video_url) == resolved_url {
                video.comment_count = Some(count);
            }
        }
    }
}
