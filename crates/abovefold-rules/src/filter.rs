//! Declaration and relevance filtering plus deduplication.

use std::collections::HashSet;

use crate::types::CssRule;

/// Property name prefixes that never matter for first paint.
const EXCLUDED_PREFIXES: [&str; 2] = ["animation", "transition"];

/// Shadow properties, dropped unless `include_shadows` is set.
const SHADOW_PROPERTIES: [&str; 2] = ["box-shadow", "text-shadow"];

/// Vendor prefixes stripped before matching the exclusion lists.
const VENDOR_PREFIXES: [&str; 4] = ["-webkit-", "-moz-", "-ms-", "-o-"];

fn unprefixed(property: &str) -> &str {
    for vp in VENDOR_PREFIXES {
        if let Some(rest) = property.strip_prefix(vp) {
            return rest;
        }
    }
    property
}

/// Whether a property is excluded from critical CSS.
pub(crate) fn is_excluded_property(property: &str, include_shadows: bool) -> bool {
    let base = unprefixed(property);
    if EXCLUDED_PREFIXES.iter().any(|p| base.starts_with(p)) {
        return true;
    }
    if !include_shadows && SHADOW_PROPERTIES.contains(&base) {
        return true;
    }
    false
}

/// Drop non-critical declarations from ordinary rules. Rules left with no
/// declarations are dropped entirely. Font-face rules pass through untouched.
pub fn filter_declarations(rules: Vec<CssRule>, include_shadows: bool) -> Vec<CssRule> {
    rules
        .into_iter()
        .filter_map(|mut rule| {
            if rule.is_font_face() {
                return Some(rule);
            }
            rule.declarations
                .retain(|d| !is_excluded_property(&d.property, include_shadows));
            if rule.declarations.is_empty() {
                None
            } else {
                Some(rule)
            }
        })
        .collect()
}

/// Keep rules whose selector matches the above-fold set. Font-face rules are
/// always retained.
pub fn filter_by_relevance(rules: Vec<CssRule>, selectors: &HashSet<String>) -> Vec<CssRule> {
    rules
        .into_iter()
        .filter(|rule| rule.is_font_face() || selector_matches(&rule.selector, selectors))
        .collect()
}

/// Membership test for a (possibly comma-separated) selector against the
/// above-fold set. A part also matches with its pseudo suffix stripped, so
/// `.btn:hover` is kept when `.btn` is above the fold.
fn selector_matches(selector: &str, set: &HashSet<String>) -> bool {
    selector.split(',').any(|part| {
        let part = part.trim();
        if set.contains(part) {
            return true;
        }
        match part.find(':') {
            Some(idx) if idx > 0 => set.contains(part[..idx].trim_end()),
            _ => false,
        }
    })
}

/// Remove exact `(selector, mediaQuery)` duplicates, keeping the first
/// occurrence in its original position.
pub fn dedupe(rules: Vec<CssRule>) -> Vec<CssRule> {
    let mut seen = HashSet::new();
    rules
        .into_iter()
        .filter(|rule| seen.insert(rule.dedupe_key()))
        .collect()
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
