//! CDP WebSocket client.
//!
//! One client per browser process. Commands are multiplexed over a single
//! WebSocket by request id; per-target traffic is routed with the flattened
//! `sessionId` attached to each command.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::page::PageChannel;
use super::protocol::{BrowserVersion, CdpMessage, CdpRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Per-command reply timeout. The extraction deadline races above this.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Pending request waiting for its response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, CdpError>>,
}

/// Shared command-dispatch state between the client and its page channels.
pub(crate) struct Dispatch {
    pub(crate) ws_tx: tokio::sync::Mutex<WsSink>,
    pub(crate) pending: Mutex<HashMap<u64, PendingRequest>>,
    pub(crate) request_id: AtomicU64,
}

/// Clears a request's pending-map slot when its caller stops waiting, so a
/// cancelled `call` future cannot strand an entry. The receive loop removes
/// answered requests first; the later removal here is then a no-op.
struct PendingCleanup<'a> {
    pending: &'a Mutex<HashMap<u64, PendingRequest>>,
    id: u64,
}

impl Drop for PendingCleanup<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

impl Dispatch {
    /// Send one command and wait for the matching response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });
        let _cleanup = PendingCleanup { pending: &self.pending, id };

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => Err(CdpError::Timeout(format!("Request {} timed out", method))),
        }
    }
}

/// CDP client bound to one browser process.
pub struct CdpClient {
    dispatch: Arc<Dispatch>,
    browser_ws_url: String,
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a browser at the given debugging endpoint
    /// (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let http = reqwest::Client::builder()
            .timeout(crate::chrome::DISCOVERY_TIMEOUT)
            .build()
            .map_err(|e| CdpError::ConnectionFailed(e.to_string()))?;
        let version: BrowserVersion = http
            .get(&version_url)
            .send()
            .await
            .map_err(|e| CdpError::BrowserNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::BrowserNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!(
            "Connected to browser: {} (protocol {})",
            version.browser, version.protocol_version
        );

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio::time::timeout(
            crate::chrome::DISCOVERY_TIMEOUT,
            tokio_tungstenite::connect_async(&browser_ws_url),
        )
        .await
        .map_err(|_| CdpError::Timeout(format!("WebSocket connect to {} timed out", browser_ws_url)))?
        .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let dispatch = Arc::new(Dispatch {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            pending: Mutex::new(HashMap::new()),
            request_id: AtomicU64::new(1),
        });

        let recv_task = {
            let dispatch = dispatch.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, dispatch).await;
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            dispatch,
            browser_ws_url,
            _recv_task: recv_task,
        })
    }

    /// WebSocket receive loop: route responses to waiting callers, drop
    /// events (the pipeline polls page state instead of subscribing).
    async fn receive_loop(mut ws_source: WsSource, dispatch: Arc<Dispatch>) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpMessage>(&text) {
                        Ok(message) => {
                            if let Some(id) = message.id {
                                let pending_req = dispatch.pending.lock().remove(&id);
                                if let Some(req) = pending_req {
                                    let result = if let Some(err) = message.error {
                                        Err(CdpError::Protocol {
                                            code: err.code,
                                            message: err.message,
                                        })
                                    } else {
                                        Ok(message.result.unwrap_or(Value::Null))
                                    };
                                    let _ = req.tx.send(result);
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("CDP WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("CDP WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a browser-level command (no session routing).
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.dispatch.call(method, params, None).await
    }

    /// Browser WebSocket URL this client is attached to.
    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// Create an isolated browsing context (separate cookies/cache).
    pub async fn create_browser_context(&self) -> Result<String, CdpError> {
        let result = self
            .call(
                "Target.createBrowserContext",
                Some(json!({"disposeOnDetach": true})),
            )
            .await?;
        result["browserContextId"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing browserContextId".to_string()))
    }

    /// Create a blank page inside a browsing context and attach to it,
    /// returning a channel routed to the new target.
    pub async fn create_page(&self, browser_context_id: &str) -> Result<PageChannel, CdpError> {
        let result = self
            .call(
                "Target.createTarget",
                Some(json!({
                    "url": "about:blank",
                    "browserContextId": browser_context_id,
                })),
            )
            .await?;
        let target_id = result["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing targetId".to_string()))?
            .to_string();

        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;
        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        debug!("Attached to target {} as session {}", target_id, session_id);

        Ok(PageChannel::new(target_id, session_id, self.dispatch.clone()))
    }

    /// Dispose an isolated browsing context and every page inside it.
    pub async fn dispose_browser_context(&self, browser_context_id: &str) -> Result<(), CdpError> {
        self.call(
            "Target.disposeBrowserContext",
            Some(json!({"browserContextId": browser_context_id})),
        )
        .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_call_clears_its_pending_slot() {
        let pending: Mutex<HashMap<u64, PendingRequest>> = Mutex::new(HashMap::new());
        let (tx, _rx) = oneshot::channel();
        pending.lock().insert(7, PendingRequest { tx });

        {
            let _cleanup = PendingCleanup { pending: &pending, id: 7 };
            // Dropped without the response arriving, as when the caller's
            // future is cancelled mid-flight.
        }

        assert!(pending.lock().is_empty());
    }

    #[test]
    fn answered_call_cleanup_is_a_noop() {
        let pending: Mutex<HashMap<u64, PendingRequest>> = Mutex::new(HashMap::new());
        let (tx, _rx) = oneshot::channel();
        pending.lock().insert(3, PendingRequest { tx });

        // The receive loop removes the slot when the response lands.
        let _ = pending.lock().remove(&3);
        drop(PendingCleanup { pending: &pending, id: 3 });

        assert!(pending.lock().is_empty());
    }
}
