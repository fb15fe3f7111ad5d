//! CDP transport error types.

use thiserror::Error;

/// Errors from the CDP client layer. These are raw transport/protocol
/// failures; the session layer classifies them into the extraction taxonomy.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to the browser endpoint.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Browser not reachable on the debugging port.
    #[error("Browser not available at {0}")]
    BrowserNotAvailable(String),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error response from the protocol.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation reported an error (carries the browser's errorText, e.g.
    /// `net::ERR_NAME_NOT_RESOLVED`).
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Page-side JavaScript threw during evaluation.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A command did not answer in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The connection or target went away.
    #[error("Session closed")]
    SessionClosed,

    /// Response missing an expected field.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}
