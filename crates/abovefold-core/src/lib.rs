//! Extraction orchestration: fold classification plus pipeline composition.
//!
//! The browser crate produces raw geometry and stylesheet text; the rules
//! crate transforms CSS. This crate sits between them: it classifies which
//! elements are above the fold, derives their selectors, and drives the
//! whole extraction under a hard deadline with guaranteed session teardown.

pub mod extract;
pub mod fold;

pub use extract::{combine_css, validate_result, ExtractOptions, Extractor};
