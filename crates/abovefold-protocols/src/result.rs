//! Extraction results and validation reports.

use serde::{Deserialize, Serialize};

/// Result of one single-viewport extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Minified critical CSS.
    pub css: String,
    /// Output size in bytes.
    pub size: usize,
    /// Elapsed extraction time in milliseconds.
    pub extraction_time_ms: u128,
    /// Viewport label the extraction ran under.
    pub viewport: String,
    /// Source URL.
    pub url: String,
}

impl ExtractionResult {
    pub fn new(css: String, viewport: &str, url: &str, extraction_time_ms: u128) -> Self {
        let size = css.len();
        Self {
            css,
            size,
            extraction_time_ms,
            viewport: viewport.to_string(),
            url: url.to_string(),
        }
    }
}

/// Union of the mobile and desktop rule sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedCss {
    pub css: String,
    pub size: usize,
}

/// Result of a dual-viewport extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualExtractionResult {
    pub url: String,
    pub mobile: ExtractionResult,
    pub desktop: ExtractionResult,
    pub combined: CombinedCss,
}

/// Outcome of validating an extraction. Errors are fatal, warnings are not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A passing report with no findings.
    pub fn ok() -> Self {
        Self { is_valid: true, errors: Vec::new(), warnings: Vec::new() }
    }

    /// Record a fatal error and mark the report invalid.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Record a non-fatal warning.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_size_tracks_css_bytes() {
        let result = ExtractionResult::new(".a{color:red}".to_string(), "mobile", "https://x.test", 42);
        assert_eq!(result.size, 13);
        assert_eq!(result.viewport, "mobile");
    }

    #[test]
    fn report_error_invalidates() {
        let mut report = ValidationReport::ok();
        assert!(report.is_valid);
        report.push_warning("large output");
        assert!(report.is_valid);
        report.push_error("empty CSS");
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }
}
