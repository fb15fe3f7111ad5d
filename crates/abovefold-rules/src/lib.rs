//! Order-preserving CSS transformation pipeline.
//!
//! Turns a page's raw stylesheet text into the minimal CSS needed for the
//! above-the-fold element set:
//!
//! 1. [`parse`] — raw text to an ordered rule list
//! 2. [`filter_declarations`] — drop non-first-paint properties
//! 3. [`filter_by_relevance`] — keep rules matching the above-fold selector
//!    set (`@font-face` is always kept)
//! 4. [`dedupe`] — remove exact `(selector, mediaQuery)` duplicates,
//!    first occurrence wins
//! 5. [`generate`] — serialize in document order
//! 6. [`minify`] — strip comments and whitespace
//!
//! Each stage is independently callable; [`process`] runs them all. The
//! pipeline is a fixed point on its own output: re-running it on already
//! processed CSS yields identical text.

mod filter;
mod output;
mod parser;
mod types;

use std::collections::HashSet;

pub use filter::{dedupe, filter_by_relevance, filter_declarations};
pub use output::{generate, minify};
pub use parser::parse;
pub use types::{CssRule, Declaration, RuleKind, FONT_FACE_SELECTOR};

/// Options for the full pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Retain `box-shadow`/`text-shadow` declarations.
    pub include_shadows: bool,
}

/// Run the whole pipeline: parse, filter, dedupe, generate, minify.
pub fn process(raw_css: &str, selectors: &HashSet<String>, options: PipelineOptions) -> String {
    let rules = parse(raw_css);
    let rules = filter_declarations(rules, options.include_shadows);
    let rules = filter_by_relevance(rules, selectors);
    let rules = dedupe(rules);
    minify(&generate(&rules))
}
