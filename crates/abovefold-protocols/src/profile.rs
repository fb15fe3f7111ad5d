//! Performance profile: throttling and timing constants for one extraction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed throttling/timing constants applied to every rendering session.
///
/// The defaults approximate a mid-range phone on a slow 4G connection, which
/// is the audience critical CSS is extracted for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceProfile {
    /// CPU slowdown multiplier (1.0 = no throttling).
    pub cpu_throttle_rate: f64,
    /// Added network round-trip latency in milliseconds.
    pub network_latency_ms: u64,
    /// Download throughput in bytes per second.
    pub download_throughput: u64,
    /// Upload throughput in bytes per second.
    pub upload_throughput: u64,
    /// Quiet period after the last LCP candidate before the page counts as
    /// paint-stable.
    pub lcp_stabilization_delay_ms: u64,
    /// Fallback window when no LCP candidate arrives at all.
    pub lcp_fallback_ms: u64,
    /// Interval at which the stabilization flag is polled.
    pub poll_interval_ms: u64,
    /// Hard deadline for one whole extraction.
    pub overall_timeout_ms: u64,
    /// DOM-mutation quiet period for the content-settle wait.
    pub settle_quiet_ms: u64,
    /// Upper bound on the content-settle wait.
    pub settle_timeout_ms: u64,
    /// Vertical tolerance added around the viewport for above-fold
    /// classification, in pixels.
    pub fold_buffer_px: f64,
    /// Maximum simultaneously open browsing contexts.
    pub max_contexts: usize,
}

impl Default for PerformanceProfile {
    fn default() -> Self {
        Self {
            cpu_throttle_rate: 4.0,
            network_latency_ms: 150,
            download_throughput: 400_000,
            upload_throughput: 400_000,
            lcp_stabilization_delay_ms: 500,
            lcp_fallback_ms: 3_000,
            poll_interval_ms: 100,
            overall_timeout_ms: 20_000,
            settle_quiet_ms: 250,
            settle_timeout_ms: 2_000,
            fold_buffer_px: 50.0,
            max_contexts: 4,
        }
    }
}

impl PerformanceProfile {
    /// Overall hard deadline as a `Duration`.
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }

    /// Polling interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Recommended ceiling for critical CSS output, in bytes. Inlined CSS above
/// roughly one TCP initial congestion window stops paying for itself.
pub const RECOMMENDED_MAX_BYTES: usize = 14 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let p = PerformanceProfile::default();
        assert!((p.cpu_throttle_rate - 4.0).abs() < f64::EPSILON);
        assert_eq!(p.lcp_stabilization_delay_ms, 500);
        assert_eq!(p.overall_timeout_ms, 20_000);
        assert_eq!(p.settle_quiet_ms, 250);
        assert_eq!(p.overall_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn recommended_ceiling_is_14k() {
        assert_eq!(RECOMMENDED_MAX_BYTES, 14_336);
    }
}
