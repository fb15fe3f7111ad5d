//! Browser-driven rendering sessions for critical CSS extraction.
//!
//! Talks to a shared headless Chrome over the Chrome DevTools Protocol:
//! one browser process for the whole service, one isolated browsing context
//! per extraction request. Each session is configured (viewport, user agent,
//! locale/timezone, reduced motion, CPU and network throttling) before any
//! navigation, then loads the target page, waits for paint stability and DOM
//! quiescence, and exposes element snapshots plus the page's raw CSS.
//!
//! ```text
//! ┌──────────────────┐    WebSocket     ┌──────────────────┐
//! │  SessionManager  │ ◄──────────────► │  headless Chrome │
//! │  (this crate)    │       CDP        │  (shared process)│
//! └──────────────────┘                  └──────────────────┘
//! ```
//!
//! The stabilization detector and the content-settle wait never fail: a
//! degraded paint-stability read beats failing the whole extraction.

pub mod analyze;
pub mod cdp;
pub mod chrome;
pub mod session;
pub mod settle;
pub mod stabilize;

pub use analyze::DomAnalyzer;
pub use cdp::{CdpClient, CdpError, PageChannel};
pub use chrome::ChromeConfig;
pub use session::{RenderingSession, SessionManager};
pub use stabilize::{StabilizationDetector, StabilizationMetrics};
