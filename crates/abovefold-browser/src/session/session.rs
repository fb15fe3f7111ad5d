//! One rendering session: an isolated browsing context bound to a paint
//! stabilization detector and a DOM analyzer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, info, warn};

use abovefold_protocols::{
    ElementSnapshot, ExtractError, PageViewportInfo, PaintEntry, PerformanceProfile,
    ViewportProfile,
};

use crate::analyze::DomAnalyzer;
use crate::cdp::{CdpError, PageChannel};
use crate::settle::wait_for_content_settle;
use crate::stabilize::{StabilizationDetector, StabilizationMetrics};

/// Classify a raw CDP failure into the extraction taxonomy. Applied at the
/// loader boundary; upper layers pass classified errors through unchanged.
pub(crate) fn classify(e: CdpError) -> ExtractError {
    match e {
        CdpError::Timeout(msg) => ExtractError::timeout(msg),
        CdpError::NavigationFailed(msg) => {
            ExtractError::network(format!("navigation failed: {}", msg))
        }
        other => ExtractError::rendering_with(other.to_string(), Box::new(other)),
    }
}

const RAW_CSS_SCRIPT: &str = r#"(() => {
  const parts = [];
  for (const node of document.querySelectorAll('style, link[rel="stylesheet"]')) {
    if (node.tagName === 'STYLE') {
      parts.push(node.textContent || '');
      continue;
    }
    const sheet = node.sheet;
    if (!sheet) { continue; }
    try {
      parts.push(Array.from(sheet.cssRules).map((r) => r.cssText).join('\n'));
    } catch (e) {
      // cross-origin stylesheet, not readable; skipped rather than fatal
    }
  }
  return parts.join('\n');
})()"#;

/// An isolated browsing context for one extraction request.
///
/// Created by the session manager, destroyed on every exit path. Never
/// outlives its request; no state is shared across sessions.
pub struct RenderingSession {
    pub(crate) id: String,
    pub(crate) browser_context_id: String,
    url: String,
    viewport: ViewportProfile,
    profile: PerformanceProfile,
    channel: Arc<PageChannel>,
    detector: StabilizationDetector,
    analyzer: DomAnalyzer,
    paint_entries: Mutex<Vec<PaintEntry>>,
    /// Held for the lifetime of the session; bounds open contexts.
    _permit: OwnedSemaphorePermit,
}

impl RenderingSession {
    pub(crate) fn new(
        id: String,
        browser_context_id: String,
        url: String,
        viewport: ViewportProfile,
        profile: PerformanceProfile,
        channel: Arc<PageChannel>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        let detector = StabilizationDetector::new(channel.clone(), profile.clone());
        let analyzer = DomAnalyzer::new(channel.clone());
        Self {
            id,
            browser_context_id,
            url,
            viewport,
            profile,
            channel,
            detector,
            analyzer,
            paint_entries: Mutex::new(Vec::new()),
            _permit: permit,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn viewport(&self) -> &ViewportProfile {
        &self.viewport
    }

    /// Navigate and wait until the page's visual state is final: DOM ready,
    /// paint stabilized, DOM mutations settled. Stabilization and settling
    /// degrade gracefully; navigation and readiness failures are classified
    /// and returned.
    pub async fn load_page(&self, timeout: Duration) -> Result<(), ExtractError> {
        let deadline = Instant::now() + timeout;

        let result = self
            .channel
            .call("Page.navigate", Some(json!({"url": self.url})))
            .await
            .map_err(classify)?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            if !error_text.is_empty() {
                return Err(ExtractError::network(format!(
                    "navigation to {} failed: {}",
                    self.url, error_text
                )));
            }
        }

        self.wait_for_ready(deadline).await?;
        debug!("DOM ready for {}", self.url);

        // The observer registers with `buffered: true`, so candidates that
        // painted before this point are still reported.
        self.detector.install().await;
        let entries = self.detector.wait_for_stable().await;
        info!(
            "Paint stabilized for {} with {} LCP entries",
            self.url,
            entries.len()
        );
        *self.paint_entries.lock() = entries;

        let settled = wait_for_content_settle(&self.channel, &self.profile).await;
        if !settled {
            warn!("Content did not settle for {}; proceeding anyway", self.url);
        }

        Ok(())
    }

    /// Poll `document.readyState` until the DOM is usable.
    async fn wait_for_ready(&self, deadline: Instant) -> Result<(), ExtractError> {
        loop {
            let result = self
                .channel
                .evaluate("document.readyState")
                .await
                .map_err(classify)?;

            if let Some(state) = result.as_str() {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }

            if Instant::now() >= deadline {
                return Err(ExtractError::timeout(format!(
                    "page load for {} exceeded budget",
                    self.url
                )));
            }

            tokio::time::sleep(self.profile.poll_interval()).await;
        }
    }

    /// Concatenate, in page order, every inline `<style>` block and every
    /// readable external stylesheet. Unreadable (cross-origin) sheets are
    /// skipped.
    pub async fn extract_raw_css(&self) -> Result<String, ExtractError> {
        let value = self.channel.evaluate(RAW_CSS_SCRIPT).await.map_err(classify)?;
        Ok(value.as_str().unwrap_or("").to_string())
    }

    /// Raw element snapshots from the stable page.
    pub async fn element_snapshots(&self) -> Result<Vec<ElementSnapshot>, ExtractError> {
        self.analyzer.snapshot_elements().await.map_err(classify)
    }

    /// Scroll/document geometry, for diagnostics.
    pub async fn viewport_info(&self) -> Result<PageViewportInfo, ExtractError> {
        self.analyzer.viewport_info().await.map_err(classify)
    }

    /// Paint entries recorded during `load_page`.
    pub fn paint_entries(&self) -> Vec<PaintEntry> {
        self.paint_entries.lock().clone()
    }

    /// Detector diagnostics.
    pub async fn stabilization_metrics(&self) -> StabilizationMetrics {
        self.detector.metrics().await
    }

    /// Disconnect page-side observers. The manager disposes the context.
    pub(crate) async fn cleanup_page_state(&self) {
        self.detector.cleanup().await;
    }
}
