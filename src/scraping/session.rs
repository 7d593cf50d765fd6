//! One controllable browser tab.
//!
//! A `BrowserSession` is exclusively owned by the collection call that opened
//! it and must be closed before that call returns, on every exit path. It is
//! never shared across concurrent tasks — each top-level call launches its
//! own, so scroll/extract sequences cannot interleave against one page.

use std::time::Duration;

use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::core::error::HarvestError;
use crate::scraping::browser_manager;

pub struct BrowserSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl BrowserSession {
    /// Launch a fresh headless browser with one blank tab.
    ///
    /// `DriverUnavailable` when no executable exists on this machine;
    /// `SessionInit` when the launch itself fails.
    pub async fn launch() -> Result<Self, HarvestError> {
        let exe =
            browser_manager::find_chrome_executable().ok_or(HarvestError::DriverUnavailable)?;

        let config = browser_manager::build_headless_config(&exe, 1280, 900)
            .map_err(|e| HarvestError::SessionInit(e.to_string()))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| HarvestError::SessionInit(format!("launch failed ({}): {}", exe, e)))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    error!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(p) => p,
            Err(e) => {
                let mut session = Self {
                    browser: Some(browser),
                    page: None,
                    handler: Some(handle),
                };
                session.close().await;
                return Err(HarvestError::SessionInit(format!(
                    "failed to open tab: {}",
                    e
                )));
            }
        };

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handle),
        })
    }

    fn page(&self) -> Result<&Page, HarvestError> {
        self.page
            .as_ref()
            .ok_or_else(|| HarvestError::SessionInit("session already closed".to_string()))
    }

    /// Navigate and block until `settle` has elapsed, giving the client-side
    /// renderer time to produce its first batch of content.
    pub async fn open(&self, url: &str, settle: Duration) -> Result<(), HarvestError> {
        self.page()?
            .goto(url)
            .await
            .map_err(|e| HarvestError::SessionInit(format!("navigation to {} failed: {}", url, e)))?;
        tokio::time::sleep(settle).await;
        Ok(())
    }

    /// Run a script in page context and return its JSON value (`null` when
    /// the script produced nothing deserializable).
    pub async fn eval(&self, script: &str) -> Result<serde_json::Value, HarvestError> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| HarvestError::Extraction(format!("eval failed: {}", e)))?;
        Ok(result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null))
    }

    /// Current scrollable height of the page body.
    pub async fn scroll_height(&self) -> Result<i64, HarvestError> {
        Ok(self
            .eval("document.body.scrollHeight")
            .await?
            .as_i64()
            .unwrap_or(0))
    }

    pub async fn scroll_to_bottom(&self) -> Result<(), HarvestError> {
        self.eval("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map(|_| ())
    }

    /// Fully rendered markup at the time of call.
    pub async fn html(&self) -> Result<String, HarvestError> {
        self.page()?
            .content()
            .await
            .map_err(|e| HarvestError::Extraction(format!("failed to read page content: {}", e)))
    }

    /// Final navigated location, when the page exposes one.
    pub async fn current_url(&self) -> Option<String> {
        self.page.as_ref()?.url().await.ok().flatten()
    }

    /// Best-effort click on the first leaf element whose text contains
    /// `needle`. Absence is tolerated: returns `false`, never an error.
    pub async fn click_text(&self, needle: &str) -> bool {
        let needle_json = serde_json::Value::String(needle.to_string()).to_string();
        let script = format!(
            r#"(() => {{
                const needle = {needle_json};
                const nodes = document.querySelectorAll('span,div,p,button,a');
                for (const el of nodes) {{
                    if (el.childElementCount === 0 && el.textContent &&
                        el.textContent.trim().includes(needle)) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#
        );
        match self.eval(&script).await {
            Ok(v) => v.as_bool().unwrap_or(false),
            Err(e) => {
                warn!("click_text({:?}) failed (tolerated): {}", needle, e);
                false
            }
        }
    }

    /// Release the tab and the browser process. Safe to call multiple times.
    pub async fn close(&mut self) {
        self.page.take();
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("browser close error (non-fatal): {}", e);
            }
        }
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Drop cannot await; spawn the close to avoid zombie Chromium
        // processes when a caller missed an exit path.
        let Some(mut browser) = self.browser.take() else {
            return;
        };
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            return;
        };
        rt.spawn(async move {
            let _ = browser.close().await;
        });
    }
}
