//! Process-wide registry of collection tasks.
//!
//! Entries are written by the single collector loop that owns the task id and
//! read concurrently by status queries; a plain `RwLock<HashMap>` is enough
//! because the read path only needs eventual consistency. Entries are never
//! evicted — the map grows for the lifetime of the process, which is a known
//! limitation for long-running deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
    Stopped,
}

/// Progress/status record for one collection task.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionTask {
    pub status: TaskStatus,
    pub progress: f32,
    pub collected_count: usize,
    pub message: String,
}

impl CollectionTask {
    fn starting() -> Self {
        Self {
            status: TaskStatus::Running,
            progress: 0.0,
            collected_count: 0,
            message: "starting collection".to_string(),
        }
    }
}

/// Cooperative cancellation token, one per task.
///
/// The owning loop consults it at the top of each iteration; `stop` trips it
/// from any thread. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

struct TaskEntry {
    task: CollectionTask,
    cancel: CancelToken,
}

#[derive(Default)]
pub struct TaskRegistry {
    inner: RwLock<HashMap<String, TaskEntry>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new running task under a time-based id and hand back the
    /// id together with its cancellation token.
    pub fn register(&self, prefix: &str) -> (String, CancelToken) {
        let id = new_task_id(prefix);
        let cancel = CancelToken::default();
        let entry = TaskEntry {
            task: CollectionTask::starting(),
            cancel: cancel.clone(),
        };
        self.inner
            .write()
            .expect("task registry lock poisoned")
            .insert(id.clone(), entry);
        (id, cancel)
    }

    pub fn get(&self, id: &str) -> Option<CollectionTask> {
        self.inner
            .read()
            .expect("task registry lock poisoned")
            .get(id)
            .map(|e| e.task.clone())
    }

    /// Mutate the task record in place. Unknown ids are ignored — the owning
    /// loop is the only writer, so a miss here just means the task was never
    /// registered.
    pub fn update(&self, id: &str, f: impl FnOnce(&mut CollectionTask)) {
        if let Some(entry) = self
            .inner
            .write()
            .expect("task registry lock poisoned")
            .get_mut(id)
        {
            f(&mut entry.task);
        }
    }

    pub fn complete(&self, id: &str, collected: usize) {
        self.update(id, |t| {
            t.status = TaskStatus::Completed;
            t.progress = 100.0;
            t.collected_count = collected;
            t.message = format!("collection completed, {} records", collected);
        });
    }

    pub fn fail(&self, id: &str, message: &str) {
        let message = message.to_string();
        self.update(id, |t| {
            t.status = TaskStatus::Failed;
            t.progress = 0.0;
            t.collected_count = 0;
            t.message = message;
        });
    }

    /// Trip the cancellation token for `id`. Idempotent; unknown ids are a
    /// no-op. The running loop flips the status to `stopped` at its next
    /// iteration boundary, but we mark it eagerly too so a status poll right
    /// after the stop call already sees the intent.
    pub fn stop(&self, id: &str) {
        if let Some(entry) = self
            .inner
            .write()
            .expect("task registry lock poisoned")
            .get_mut(id)
        {
            entry.cancel.cancel();
            if entry.task.status == TaskStatus::Running {
                entry.task.status = TaskStatus::Stopped;
                entry.task.message = "collection stopped".to_string();
            }
        }
    }

    pub fn mark_stopped(&self, id: &str, collected: usize) {
        self.update(id, |t| {
            t.status = TaskStatus::Stopped;
            t.collected_count = collected;
            t.message = format!("collection stopped, {} records kept", collected);
        });
    }
}

/// Time-based task id: `prefix_YYYYmmdd_HHMMSS_micros`, distinguishable and
/// roughly sortable by creation time.
fn new_task_id(prefix: &str) -> String {
    format!("{}_{}", prefix, chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f"))
}
