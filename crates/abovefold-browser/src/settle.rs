//! Content-settle wait: DOM mutation quiescence after paint stabilization.
//!
//! Reduces false positives on above-fold detection for late-injected DOM.
//! Purely advisory: it reports whether the DOM went quiet, and the pipeline
//! proceeds either way.

use std::time::Instant;

use tracing::{debug, warn};

use abovefold_protocols::PerformanceProfile;

use crate::cdp::PageChannel;

const INSTALL: &str = r#"(() => {
  if (window.__afSettle) { return true; }
  const state = { last: performance.now() };
  window.__afSettle = state;
  const observer = new MutationObserver(() => { state.last = performance.now(); });
  observer.observe(document.documentElement, {
    childList: true, subtree: true, attributes: true, characterData: true
  });
  state.observer = observer;
  return true;
})()"#;

const QUIET_FOR: &str =
    "window.__afSettle ? (performance.now() - window.__afSettle.last) : -1";

const CLEANUP: &str = r#"(() => {
  const s = window.__afSettle;
  if (s && s.observer) { s.observer.disconnect(); }
  delete window.__afSettle;
  return true;
})()"#;

/// Wait until no DOM mutation has been observed for `settle_quiet_ms`, up to
/// `settle_timeout_ms`. Returns whether the DOM actually went quiet; never
/// errors.
pub async fn wait_for_content_settle(channel: &PageChannel, profile: &PerformanceProfile) -> bool {
    if let Err(e) = channel.evaluate(INSTALL).await {
        warn!("Mutation observer install failed, skipping content-settle: {}", e);
        return false;
    }

    let deadline = Instant::now() + std::time::Duration::from_millis(profile.settle_timeout_ms);
    let interval = profile.poll_interval();
    let quiet_ms = profile.settle_quiet_ms as f64;

    let settled = loop {
        match channel.evaluate(QUIET_FOR).await {
            Ok(value) => {
                let quiet = value.as_f64().unwrap_or(-1.0);
                if quiet >= quiet_ms {
                    debug!("DOM quiet for {:.0}ms, content settled", quiet);
                    break true;
                }
            }
            Err(e) => {
                warn!("Content-settle poll failed: {}", e);
                break false;
            }
        }
        if Instant::now() >= deadline {
            debug!("Content-settle window elapsed without quiescence");
            break false;
        }
        tokio::time::sleep(interval).await;
    };

    if let Err(e) = channel.evaluate(CLEANUP).await {
        debug!("Mutation observer cleanup skipped: {}", e);
    }

    settled
}
