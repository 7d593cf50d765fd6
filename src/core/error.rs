use thiserror::Error;

/// Failure taxonomy for the harvesting core.
///
/// The variants map onto distinct propagation policies:
/// * `DriverUnavailable` — no browser on this machine; every collection
///   endpoint degrades to HTTP 503 without attempting work.
/// * `SessionInit` — fatal to the one task that hit it; recorded as
///   `status=failed` on the owning task.
/// * `Extraction` — per-iteration; logged and treated as zero yield, the
///   surrounding loop continues.
/// * `Resolution` — per-video; that video is skipped, the pipeline continues.
/// * `TaskNotFound` — unknown id on a status query (HTTP 404).
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no usable browser executable found; install Chrome or Chromium, or set CHROME_EXECUTABLE")]
    DriverUnavailable,

    #[error("browser session init failed: {0}")]
    SessionInit(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("failed to resolve video url {url}: {reason}")]
    Resolution { url: String, reason: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),
}

impl HarvestError {
    /// `true` for errors that mean the whole collection capability is down,
    /// not just this one call.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, HarvestError::DriverUnavailable)
    }
}
