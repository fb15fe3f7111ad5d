//! Extraction orchestrator.
//!
//! Composes the rendering session, the fold classifier and the rule engine
//! into single- and dual-viewport extractions. The session is torn down on
//! every exit path; the overall deadline races the whole pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use url::Url;

use abovefold_browser::{RenderingSession, SessionManager};
use abovefold_protocols::{
    CombinedCss, DualExtractionResult, ExtractError, ExtractionResult, ValidationReport,
    ViewportProfile, RECOMMENDED_MAX_BYTES,
};
use abovefold_rules::PipelineOptions;

/// Per-request extraction options.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub viewport: ViewportProfile,
    /// Overall deadline override; defaults to the performance profile's.
    pub timeout: Option<Duration>,
    /// Retain shadow declarations in the output.
    pub include_shadows: bool,
    /// User-agent override, forwarded into the viewport profile.
    pub user_agent: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            viewport: ViewportProfile::mobile(),
            timeout: None,
            include_shadows: false,
            user_agent: None,
        }
    }
}

/// Orchestrates critical CSS extraction over a session manager.
pub struct Extractor {
    sessions: Arc<SessionManager>,
}

impl Extractor {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Extract the critical CSS for one URL and viewport.
    ///
    /// Creates an isolated session, loads the page under throttling, waits
    /// for paint stability, classifies the above-fold element set, runs the
    /// rule engine over the page's raw CSS, and tears the session down —
    /// also when any step fails or the deadline expires.
    pub async fn extract_critical_css(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult, ExtractError> {
        validate_url(url)?;

        let started = Instant::now();
        let deadline = options
            .timeout
            .unwrap_or_else(|| self.sessions.performance_profile().overall_timeout());
        let viewport = options
            .viewport
            .clone()
            .with_user_agent(options.user_agent.clone());
        let label = viewport.label();

        // Session creation races the deadline too: a wedged browser endpoint
        // must not stall the request past its budget. The slot keeps any
        // session the timed-out future managed to create reachable for
        // teardown.
        let mut session: Option<RenderingSession> = None;
        let outcome = tokio::time::timeout(deadline, async {
            let created = self.sessions.create_session(url, viewport).await?;
            let created = session.insert(created);
            self.run_pipeline(created, deadline, options.include_shadows)
                .await
        })
        .await;

        // Teardown runs before the outcome is inspected, so no exit path
        // leaves the browsing context open.
        if let Some(session) = &session {
            self.sessions.close(session).await;
        }

        let css = match outcome {
            Ok(result) => result?,
            Err(_) => {
                return Err(ExtractError::timeout(format!(
                    "extraction of {} exceeded {}ms",
                    url,
                    deadline.as_millis()
                )));
            }
        };

        let result =
            ExtractionResult::new(css, label, url, started.elapsed().as_millis());
        info!(
            "Extracted {} bytes of critical CSS for {} ({}) in {}ms",
            result.size, url, label, result.extraction_time_ms
        );
        Ok(result)
    }

    async fn run_pipeline(
        &self,
        session: &RenderingSession,
        deadline: Duration,
        include_shadows: bool,
    ) -> Result<String, ExtractError> {
        session.load_page(deadline).await?;

        let viewport_height = f64::from(session.viewport().height);
        let buffer = self.sessions.performance_profile().fold_buffer_px;

        let snapshots = session.element_snapshots().await?;
        let elements = crate::fold::annotate(snapshots, viewport_height, buffer);
        let selectors = crate::fold::above_fold_selectors(&elements);
        let fonts = crate::fold::used_font_families(&elements);
        debug!(
            "{} above-fold selectors, {} font families in use",
            selectors.len(),
            fonts.len()
        );

        if let Ok(info) = session.viewport_info().await {
            debug!(
                "Page geometry: scroll ({}, {}), document height {}",
                info.scroll_x, info.scroll_y, info.document_height
            );
        }
        let metrics = session.stabilization_metrics().await;
        debug!(
            "Stabilization: {} paint entries, last render at {:.0}ms",
            metrics.entry_count, metrics.last_render_time
        );

        let raw_css = session.extract_raw_css().await?;
        debug!("Collected {} bytes of raw CSS", raw_css.len());

        Ok(abovefold_rules::process(
            &raw_css,
            &selectors,
            PipelineOptions { include_shadows },
        ))
    }

    /// Run the single-viewport flow for both canonical viewports and build
    /// the combined output: mobile rules first in their original order, then
    /// desktop rules not already present on the `(selector, mediaQuery)` key.
    pub async fn extract_for_both_viewports(
        &self,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<DualExtractionResult, ExtractError> {
        let mobile_options = ExtractOptions {
            viewport: ViewportProfile::mobile(),
            ..options.clone()
        };
        let desktop_options = ExtractOptions {
            viewport: ViewportProfile::desktop(),
            ..options.clone()
        };

        let mobile = self.extract_critical_css(url, &mobile_options).await?;
        let desktop = self.extract_critical_css(url, &desktop_options).await?;

        let css = combine_css(&mobile.css, &desktop.css);
        let combined = CombinedCss { size: css.len(), css };

        Ok(DualExtractionResult {
            url: url.to_string(),
            mobile,
            desktop,
            combined,
        })
    }

    /// Validate an extraction result. Never fails: problems land in the
    /// report as errors (fatal) or warnings (advisory).
    pub fn validate_extraction(&self, result: &ExtractionResult) -> ValidationReport {
        validate_result(result)
    }

    /// Release every open session and the shared browser process.
    pub async fn close(&self) {
        self.sessions.close_all().await;
    }
}

/// Mobile-first union of two rule sets, deduplicated on
/// `(selector, mediaQuery)` with mobile occurrences winning.
pub fn combine_css(mobile_css: &str, desktop_css: &str) -> String {
    let mut rules = abovefold_rules::parse(mobile_css);
    rules.extend(abovefold_rules::parse(desktop_css));
    let rules = abovefold_rules::dedupe(rules);
    abovefold_rules::minify(&abovefold_rules::generate(&rules))
}

/// Validation rules: empty output is fatal; output beyond the recommended
/// inline ceiling is a warning.
pub fn validate_result(result: &ExtractionResult) -> ValidationReport {
    let mut report = ValidationReport::ok();
    if result.css.trim().is_empty() {
        report.push_error("critical CSS is empty");
    }
    if result.size > RECOMMENDED_MAX_BYTES {
        report.push_warning(format!(
            "critical CSS is {} bytes, above the recommended {} byte ceiling",
            result.size, RECOMMENDED_MAX_BYTES
        ));
    }
    report
}

fn validate_url(url: &str) -> Result<(), ExtractError> {
    let parsed = Url::parse(url)
        .map_err(|e| ExtractError::validation(format!("invalid URL {:?}: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ExtractError::validation(format!(
            "unsupported URL scheme {:?}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(ExtractError::validation("URL has no host"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
