//! DOM snapshot collection.
//!
//! Runs inside the stable page and captures the raw per-element data the
//! pure classifier needs: tag, id, classes, geometry and a computed-style
//! subset. Classification itself (above-fold test, selector derivation,
//! visible-text filtering) happens in Rust so it is testable without a
//! browser.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use abovefold_protocols::{ElementSnapshot, PageViewportInfo};

use crate::cdp::{CdpError, PageChannel};

/// Tags that never render content; skipped at capture time.
const SNAPSHOT_SCRIPT: &str = r#"(() => {
  const skip = new Set(['SCRIPT', 'STYLE', 'META', 'LINK', 'TITLE', 'HEAD', 'NOSCRIPT']);
  const out = [];
  for (const el of document.querySelectorAll('*')) {
    if (skip.has(el.tagName)) { continue; }
    const r = el.getBoundingClientRect();
    const cs = window.getComputedStyle(el);
    out.push({
      tag: el.tagName.toLowerCase(),
      id: el.id || null,
      classes: Array.from(el.classList),
      rect: { x: r.x, y: r.y, width: r.width, height: r.height },
      style: {
        display: cs.display,
        visibility: cs.visibility,
        opacity: cs.opacity,
        fontSize: cs.fontSize,
        fontFamily: cs.fontFamily
      },
      hasText: (el.textContent || '').trim().length > 0
    });
  }
  return JSON.stringify(out);
})()"#;

const VIEWPORT_SCRIPT: &str = r#"JSON.stringify({
  scrollX: window.scrollX,
  scrollY: window.scrollY,
  documentHeight: document.documentElement.scrollHeight
})"#;

/// Captures element snapshots from one rendered page.
pub struct DomAnalyzer {
    channel: Arc<PageChannel>,
}

impl DomAnalyzer {
    pub fn new(channel: Arc<PageChannel>) -> Self {
        Self { channel }
    }

    /// Snapshot every candidate element in the current DOM.
    pub async fn snapshot_elements(&self) -> Result<Vec<ElementSnapshot>, CdpError> {
        let value = self.channel.evaluate(SNAPSHOT_SCRIPT).await?;
        let snapshots = decode_snapshots(&value)?;
        debug!("Captured {} element snapshots", snapshots.len());
        Ok(snapshots)
    }

    /// Scroll offsets and document height, for diagnostics.
    pub async fn viewport_info(&self) -> Result<PageViewportInfo, CdpError> {
        let value = self.channel.evaluate(VIEWPORT_SCRIPT).await?;
        let text = value
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("viewport info not a string".to_string()))?;
        Ok(serde_json::from_str(text)?)
    }
}

fn decode_snapshots(value: &Value) -> Result<Vec<ElementSnapshot>, CdpError> {
    let text = value
        .as_str()
        .ok_or_else(|| CdpError::InvalidResponse("element snapshot not a string".to_string()))?;
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_snapshot_payload() {
        let payload = serde_json::json!(
            r#"[
                {"tag":"div","id":"hero","classes":["banner"],
                 "rect":{"x":0,"y":0,"width":360,"height":240},
                 "style":{"display":"block","visibility":"visible","opacity":"1",
                          "fontSize":"16px","fontFamily":"Inter, sans-serif"},
                 "hasText":true},
                {"tag":"footer","id":null,"classes":[],
                 "rect":{"x":0,"y":2200,"width":360,"height":80},
                 "style":{"display":"block","visibility":"visible","opacity":"1",
                          "fontSize":"14px","fontFamily":"Inter, sans-serif"},
                 "hasText":true}
            ]"#
        );
        let snapshots = decode_snapshots(&payload).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].id.as_deref(), Some("hero"));
        assert_eq!(snapshots[1].tag, "footer");
        assert_eq!(snapshots[1].rect.y, 2200.0);
    }

    #[test]
    fn non_string_payload_is_an_error() {
        let payload = serde_json::json!([1, 2, 3]);
        assert!(decode_snapshots(&payload).is_err());
    }

    #[test]
    fn snapshot_script_skips_non_visual_tags() {
        for tag in ["SCRIPT", "STYLE", "META", "LINK", "TITLE", "HEAD", "NOSCRIPT"] {
            assert!(SNAPSHOT_SCRIPT.contains(&format!("'{}'", tag)));
        }
    }
}
