//! Extraction error taxonomy.
//!
//! Raw browser-layer failures are classified into one of these kinds at the
//! loader boundary; upper layers pass them through without re-wrapping.

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// All the ways an extraction can fail.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Malformed input (bad URL, unsupported viewport token). Client error,
    /// never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Navigation or overall pipeline deadline exceeded.
    #[error("Timeout: {message}")]
    Timeout {
        message: String,
        #[source]
        source: Option<Source>,
    },

    /// Connection-level failure reported by the rendering layer.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Source>,
    },

    /// Any other failure while loading or evaluating the page.
    #[error("Rendering error: {message}")]
    Rendering {
        message: String,
        #[source]
        source: Option<Source>,
    },
}

impl ExtractError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout { message: message.into(), source: None }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into(), source: None }
    }

    pub fn rendering(message: impl Into<String>) -> Self {
        Self::Rendering { message: message.into(), source: None }
    }

    pub fn timeout_with(message: impl Into<String>, source: Source) -> Self {
        Self::Timeout { message: message.into(), source: Some(source) }
    }

    pub fn network_with(message: impl Into<String>, source: Source) -> Self {
        Self::Network { message: message.into(), source: Some(source) }
    }

    pub fn rendering_with(message: impl Into<String>, source: Source) -> Self {
        Self::Rendering { message: message.into(), source: Some(source) }
    }

    /// Stable token identifying the error kind, used in API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Timeout { .. } => "timeout_error",
            Self::Network { .. } => "network_error",
            Self::Rendering { .. } => "rendering_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ExtractError::validation("bad url").kind(), "validation_error");
        assert_eq!(ExtractError::timeout("deadline").kind(), "timeout_error");
        assert_eq!(ExtractError::network("refused").kind(), "network_error");
        assert_eq!(ExtractError::rendering("eval failed").kind(), "rendering_error");
    }

    #[test]
    fn display_includes_message() {
        let err = ExtractError::timeout("navigation exceeded 20000ms");
        assert_eq!(err.to_string(), "Timeout: navigation exceeded 20000ms");
    }

    #[test]
    fn source_is_preserved() {
        use std::error::Error;
        let inner = std::io::Error::other("socket closed");
        let err = ExtractError::network_with("connection lost", Box::new(inner));
        assert!(err.source().is_some());
    }
}
