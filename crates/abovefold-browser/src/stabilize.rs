//! Paint stabilization detector.
//!
//! A two-state machine scoped to one page load: `Observing` until no new
//! largest-contentful-paint candidate has arrived for a quiet period, then
//! `Stabilized` (terminal). The page side is an injected
//! `PerformanceObserver`; the Rust side polls its snapshot on a fixed
//! interval under a hard deadline. The detector never fails: on any problem
//! it degrades to whatever entries are known and logs a warning.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, warn};

use abovefold_protocols::{PaintEntry, PerformanceProfile};

use crate::cdp::PageChannel;

/// Non-blocking view of the detector state.
#[derive(Debug, Clone, Default)]
pub struct StabilizationMetrics {
    pub stabilized: bool,
    pub entry_count: usize,
    /// Render time of the last (effective) LCP candidate, ms from nav start.
    pub last_render_time: f64,
    /// Milliseconds the page script has been observing.
    pub elapsed_ms: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaintState {
    #[serde(default)]
    stabilized: bool,
    #[serde(default)]
    entries: Vec<PaintEntry>,
    #[serde(default)]
    elapsed: f64,
}

/// Observes LCP-class paint signals inside one page.
pub struct StabilizationDetector {
    channel: Arc<PageChannel>,
    profile: PerformanceProfile,
    last_seen: Mutex<Vec<PaintEntry>>,
}

fn observer_script(profile: &PerformanceProfile) -> String {
    format!(
        r#"(() => {{
  if (window.__afPaint) {{ return true; }}
  const state = {{ entries: [], stabilized: false, startedAt: performance.now() }};
  window.__afPaint = state;
  let silence = null;
  const markStable = () => {{ state.stabilized = true; }};
  const fallback = setTimeout(() => {{
    if (state.entries.length === 0) {{ markStable(); }}
  }}, {fallback_ms});
  try {{
    const observer = new PerformanceObserver((list) => {{
      for (const entry of list.getEntries()) {{
        state.entries.push({{
          tag: entry.element ? entry.element.tagName.toLowerCase() : '',
          renderTime: entry.renderTime || 0,
          loadTime: entry.loadTime || 0,
          size: entry.size || 0,
          url: entry.url || null
        }});
      }}
      clearTimeout(fallback);
      if (silence) {{ clearTimeout(silence); }}
      silence = setTimeout(markStable, {delay_ms});
    }});
    observer.observe({{ type: 'largest-contentful-paint', buffered: true }});
    state.observer = observer;
  }} catch (e) {{
    markStable();
  }}
  return true;
}})()"#,
        fallback_ms = profile.lcp_fallback_ms,
        delay_ms = profile.lcp_stabilization_delay_ms,
    )
}

/// Poll a snapshot source until it reports paint stability or the profile's
/// hard deadline elapses. Always resolves to the entries known so far; an
/// expired deadline is a degraded outcome, not an error. The source yields
/// `None` when the page has no readable state yet.
async fn wait_until_stable<S, Fut>(profile: &PerformanceProfile, mut snapshot: S) -> Vec<PaintEntry>
where
    S: FnMut() -> Fut,
    Fut: std::future::Future<Output = Option<PaintState>>,
{
    let deadline = Instant::now() + profile.overall_timeout();
    let interval = profile.poll_interval();
    let mut last_seen: Vec<PaintEntry> = Vec::new();

    loop {
        if let Some(state) = snapshot().await {
            if state.stabilized {
                debug!(
                    "Paint stabilized after {:.0}ms with {} entries",
                    state.elapsed,
                    state.entries.len()
                );
                return state.entries;
            }
            last_seen = state.entries;
        }
        if Instant::now() >= deadline {
            warn!(
                "Paint stabilization deadline elapsed; proceeding with {} entries",
                last_seen.len()
            );
            return last_seen;
        }
        tokio::time::sleep(interval).await;
    }
}

impl StabilizationDetector {
    pub fn new(channel: Arc<PageChannel>, profile: PerformanceProfile) -> Self {
        Self { channel, profile, last_seen: Mutex::new(Vec::new()) }
    }

    /// Register the page-side observer. Degrades to a warning on failure;
    /// the poll loop then falls back to its own deadline.
    pub async fn install(&self) {
        if let Err(e) = self.channel.evaluate(&observer_script(&self.profile)).await {
            warn!("Paint observer install failed, stabilization degraded: {}", e);
        }
    }

    async fn snapshot(&self) -> Option<PaintState> {
        const SNAPSHOT: &str = r#"(() => {
  const s = window.__afPaint;
  if (!s) { return null; }
  return JSON.stringify({
    stabilized: s.stabilized,
    entries: s.entries,
    elapsed: performance.now() - s.startedAt
  });
})()"#;
        match self.channel.evaluate(SNAPSHOT).await {
            Ok(value) => {
                let text = value.as_str()?;
                match serde_json::from_str::<PaintState>(text) {
                    Ok(state) => {
                        *self.last_seen.lock() = state.entries.clone();
                        Some(state)
                    }
                    Err(e) => {
                        warn!("Unreadable paint snapshot: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                warn!("Paint snapshot poll failed: {}", e);
                None
            }
        }
    }

    /// Poll until the page reports paint stability or the hard deadline
    /// elapses. Always resolves to the entries known so far; an expired
    /// deadline is a degraded outcome, not an error.
    pub async fn wait_for_stable(&self) -> Vec<PaintEntry> {
        wait_until_stable(&self.profile, || self.snapshot()).await
    }

    /// Entries collected so far, without waiting.
    pub async fn current_entries(&self) -> Vec<PaintEntry> {
        if let Some(state) = self.snapshot().await {
            return state.entries;
        }
        self.last_seen.lock().clone()
    }

    /// Diagnostic snapshot of the detector state.
    pub async fn metrics(&self) -> StabilizationMetrics {
        match self.snapshot().await {
            Some(state) => StabilizationMetrics {
                stabilized: state.stabilized,
                entry_count: state.entries.len(),
                last_render_time: state.entries.last().map(|e| e.render_time).unwrap_or(0.0),
                elapsed_ms: state.elapsed,
            },
            None => {
                let entries = self.last_seen.lock();
                StabilizationMetrics {
                    stabilized: false,
                    entry_count: entries.len(),
                    last_render_time: entries.last().map(|e| e.render_time).unwrap_or(0.0),
                    elapsed_ms: 0.0,
                }
            }
        }
    }

    /// Disconnect the observer and clear page-side state.
    pub async fn cleanup(&self) {
        const CLEANUP: &str = r#"(() => {
  const s = window.__afPaint;
  if (s && s.observer) { s.observer.disconnect(); }
  delete window.__afPaint;
  return true;
})()"#;
        if let Err(e) = self.channel.evaluate(CLEANUP).await {
            debug!("Paint observer cleanup skipped: {}", e);
        }
    }
}
