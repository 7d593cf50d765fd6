pub mod core;
pub mod extract;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use core::error::HarvestError;
pub use core::tasks::{CancelToken, CollectionTask, TaskRegistry, TaskStatus};
pub use core::types;
pub use core::types::*;
pub use core::AppState;

// --- Frequently used tool entry points ---
pub use scraping::{browser_manager, urls, BrowserSession};
pub use tools::{analyze, collect, comments, export, pipeline};
