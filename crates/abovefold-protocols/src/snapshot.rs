//! Page-side snapshot types: paint entries, element snapshots, viewport info.
//!
//! These mirror what the injected page scripts serialize, so the serde
//! renames follow the JavaScript camelCase field names.

use serde::{Deserialize, Serialize};

/// One largest-contentful-paint candidate reported by the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintEntry {
    /// Tag name of the painted element (lowercase).
    #[serde(default)]
    pub tag: String,
    /// Paint render time in ms relative to navigation start.
    #[serde(default)]
    pub render_time: f64,
    /// Resource load time in ms relative to navigation start.
    #[serde(default)]
    pub load_time: f64,
    /// Painted area in px².
    #[serde(default)]
    pub size: f64,
    /// Resource URL for image candidates.
    #[serde(default)]
    pub url: Option<String>,
}

/// Axis-aligned bounding rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    /// Whether the rect's vertical span intersects `[top, bottom]`.
    pub fn intersects_vertical(&self, top: f64, bottom: f64) -> bool {
        self.y <= bottom && self.y + self.height >= top
    }

    /// Whether the rect has a renderable area.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Computed-style subset captured per element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSnapshot {
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub opacity: String,
    /// Computed font-size, e.g. "16px".
    #[serde(default)]
    pub font_size: String,
    /// Computed font-family list as reported by the browser.
    #[serde(default)]
    pub font_family: String,
}

/// One element as captured from the stable page.
///
/// `selector` and `above_fold` are filled in by the classifier, not by the
/// page script; they default to empty/false on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// Lowercase tag name.
    pub tag: String,
    /// `id` attribute, when present and non-empty.
    #[serde(default)]
    pub id: Option<String>,
    /// Class list in DOM order.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Bounding client rect.
    pub rect: BoundingRect,
    /// Computed-style subset.
    #[serde(default)]
    pub style: StyleSnapshot,
    /// Whether the element has non-empty trimmed text content.
    #[serde(default)]
    pub has_text: bool,
    /// Derived matching selector (classifier output).
    #[serde(default)]
    pub selector: String,
    /// Whether the element is above the fold (classifier output).
    #[serde(default)]
    pub above_fold: bool,
}

/// Scroll/document geometry, exposed for diagnostics only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewportInfo {
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default)]
    pub document_height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_intersection() {
        let rect = BoundingRect { x: 0.0, y: 690.0, width: 100.0, height: 20.0 };
        // Top 50px past a 640px viewport: included only while the buffer
        // reaches it (100px yes, 30px no).
        assert!(rect.intersects_vertical(-100.0, 640.0 + 100.0));
        assert!(!rect.intersects_vertical(-30.0, 640.0 + 30.0));
    }

    #[test]
    fn zero_size_has_no_area() {
        let rect = BoundingRect { x: 0.0, y: 0.0, width: 0.0, height: 10.0 };
        assert!(!rect.has_area());
    }

    #[test]
    fn snapshot_decodes_page_script_json() {
        let json = r#"{
            "tag": "div",
            "id": "hero",
            "classes": ["banner", "full"],
            "rect": {"x": 0.0, "y": 12.5, "width": 360.0, "height": 200.0},
            "style": {
                "display": "block",
                "visibility": "visible",
                "opacity": "1",
                "fontSize": "16px",
                "fontFamily": "\"Inter\", sans-serif"
            },
            "hasText": true
        }"#;
        let snap: ElementSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.tag, "div");
        assert_eq!(snap.id.as_deref(), Some("hero"));
        assert_eq!(snap.classes, vec!["banner", "full"]);
        assert!(snap.has_text);
        assert_eq!(snap.style.font_size, "16px");
        // Classifier outputs default until filled in.
        assert!(snap.selector.is_empty());
        assert!(!snap.above_fold);
    }

    #[test]
    fn paint_entry_decodes_with_missing_fields() {
        let entry: PaintEntry = serde_json::from_str(r#"{"tag":"img","size":48000.0}"#).unwrap();
        assert_eq!(entry.tag, "img");
        assert_eq!(entry.render_time, 0.0);
        assert!(entry.url.is_none());
    }
}
