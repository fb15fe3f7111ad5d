//! Per-target command channel.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::client::Dispatch;
use super::error::CdpError;

/// A command channel routed to one attached page target.
pub struct PageChannel {
    target_id: String,
    session_id: String,
    dispatch: Arc<Dispatch>,
}

impl PageChannel {
    pub(crate) fn new(target_id: String, session_id: String, dispatch: Arc<Dispatch>) -> Self {
        Self { target_id, session_id, dispatch }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this target.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.dispatch.call(method, params, Some(&self.session_id)).await
    }

    /// Enable the domains the extraction pipeline uses.
    pub async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Network.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Evaluate a JavaScript expression in the page, returning its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}
