//! Above-fold classification and selector derivation.
//!
//! Pure functions over element snapshots: for a fixed viewport and buffer,
//! classification depends only on element geometry, so everything here is
//! testable without a browser.

use std::collections::HashSet;

use abovefold_protocols::{BoundingRect, ElementSnapshot};

/// Tags excluded from consideration entirely: they never render content.
const NON_VISUAL_TAGS: [&str; 7] =
    ["script", "style", "meta", "link", "title", "head", "noscript"];

/// An element is above the fold iff its bounding rect intersects the
/// vertical span `[-buffer, viewport_height + buffer]` and it has non-zero
/// width and height.
pub fn is_above_fold(rect: &BoundingRect, viewport_height: f64, buffer: f64) -> bool {
    rect.has_area() && rect.intersects_vertical(-buffer, viewport_height + buffer)
}

/// Derive the matching selector for one element, by priority:
/// `#id`, then `tag.class1.class2…` over all non-pseudo classes, then the
/// bare tag. A matching key only; not guaranteed globally unique.
pub fn derive_selector(snapshot: &ElementSnapshot) -> String {
    if let Some(id) = &snapshot.id {
        if !id.is_empty() {
            return format!("#{}", id);
        }
    }

    // Utility-CSS class names can embed pseudo variants (`hover:bg-red`);
    // those are not addressable as class selectors.
    let classes: Vec<&str> = snapshot
        .classes
        .iter()
        .map(|c| c.as_str())
        .filter(|c| !c.is_empty() && !c.contains(':'))
        .collect();

    let tag = snapshot.tag.to_ascii_lowercase();
    if classes.is_empty() {
        tag
    } else {
        format!("{}.{}", tag, classes.join("."))
    }
}

/// Classify snapshots against a viewport: non-visual tags are dropped, each
/// remaining element gets its derived selector and above-fold flag filled in.
pub fn annotate(
    snapshots: Vec<ElementSnapshot>,
    viewport_height: f64,
    buffer: f64,
) -> Vec<ElementSnapshot> {
    snapshots
        .into_iter()
        .filter(|s| !NON_VISUAL_TAGS.contains(&s.tag.to_ascii_lowercase().as_str()))
        .map(|mut s| {
            s.selector = derive_selector(&s);
            s.above_fold = is_above_fold(&s.rect, viewport_height, buffer);
            s
        })
        .collect()
}

/// Selector set of the above-fold elements.
pub fn above_fold_selectors(elements: &[ElementSnapshot]) -> HashSet<String> {
    elements
        .iter()
        .filter(|e| e.above_fold)
        .map(|e| e.selector.clone())
        .collect()
}

/// Above-fold elements with visible, non-empty text: not display:none,
/// not visibility:hidden, not opacity:0, and a positive computed font size.
pub fn visible_text_elements(elements: &[ElementSnapshot]) -> Vec<&ElementSnapshot> {
    elements
        .iter()
        .filter(|e| {
            e.above_fold
                && e.has_text
                && e.style.display != "none"
                && e.style.visibility != "hidden"
                && parse_opacity(&e.style.opacity) > 0.0
                && parse_px(&e.style.font_size) > 0.0
        })
        .collect()
}

/// Union of the font families used by visible text elements, each entry
/// trimmed and quote-stripped.
pub fn used_font_families(elements: &[ElementSnapshot]) -> HashSet<String> {
    let mut families = HashSet::new();
    for element in visible_text_elements(elements) {
        for family in element.style.font_family.split(',') {
            let family = family.trim().trim_matches(|c| c == '"' || c == '\'');
            if !family.is_empty() {
                families.insert(family.to_string());
            }
        }
    }
    families
}

fn parse_opacity(value: &str) -> f64 {
    value.trim().parse().unwrap_or(1.0)
}

fn parse_px(value: &str) -> f64 {
    value.trim().trim_end_matches("px").parse().unwrap_or(0.0)
}

#[cfg(test)]
#[path = "fold_tests.rs"]
mod tests;
