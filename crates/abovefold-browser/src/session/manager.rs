//! Session manager: one shared browser process, one isolated browsing
//! context per extraction request.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::process::Child;
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info, warn};

use abovefold_protocols::{ExtractError, PerformanceProfile, ViewportProfile};

use crate::cdp::{CdpClient, CdpError, PageChannel};
use crate::chrome::{self, ChromeConfig};
use crate::session::session::{classify, RenderingSession};

/// Owns the shared browser process and the set of open contexts.
///
/// The process is started lazily on first use. Each request gets a fresh
/// browsing context (separate cookies, viewport, throttling) so concurrent
/// extractions cannot see each other's page state. A semaphore bounds how
/// many contexts are open at once.
pub struct SessionManager {
    chrome_config: ChromeConfig,
    profile: PerformanceProfile,
    client: RwLock<Option<Arc<CdpClient>>>,
    chrome_process: tokio::sync::Mutex<Option<Child>>,
    /// Throwaway profile dir, removed when the manager is dropped.
    profile_dir: tokio::sync::Mutex<Option<tempfile::TempDir>>,
    /// Open contexts by session id.
    contexts: RwLock<HashMap<String, String>>,
    limiter: Arc<Semaphore>,
}

impl SessionManager {
    pub fn new(chrome_config: ChromeConfig, profile: PerformanceProfile) -> Self {
        let limiter = Arc::new(Semaphore::new(profile.max_contexts));
        Self {
            chrome_config,
            profile,
            client: RwLock::new(None),
            chrome_process: tokio::sync::Mutex::new(None),
            profile_dir: tokio::sync::Mutex::new(None),
            contexts: RwLock::new(HashMap::new()),
            limiter,
        }
    }

    pub fn performance_profile(&self) -> &PerformanceProfile {
        &self.profile
    }

    /// Connect to the shared browser, launching it if needed.
    async fn ensure_connected(&self) -> Result<Arc<CdpClient>, CdpError> {
        if let Some(client) = self.client.read().await.clone() {
            return Ok(client);
        }

        if !chrome::is_running(&self.chrome_config).await {
            info!(
                "No browser on port {}, launching",
                self.chrome_config.debug_port
            );
            let dir = tempfile::TempDir::new()
                .map_err(|e| CdpError::ConnectionFailed(format!("temp profile dir: {}", e)))?;
            let child = chrome::launch(&self.chrome_config, dir.path()).await?;
            *self.chrome_process.lock().await = Some(child);
            *self.profile_dir.lock().await = Some(dir);
        }

        let client = Arc::new(CdpClient::connect(&self.chrome_config.endpoint()).await?);
        *self.client.write().await = Some(client.clone());
        info!("Connected to browser at {}", self.chrome_config.endpoint());
        Ok(client)
    }

    /// Create an isolated session for one extraction request: fresh browsing
    /// context, viewport/UA/locale emulation, CPU and network throttling —
    /// all applied before any navigation.
    pub async fn create_session(
        &self,
        url: &str,
        viewport: ViewportProfile,
    ) -> Result<RenderingSession, ExtractError> {
        let permit = self
            .limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ExtractError::rendering("session limiter closed"))?;

        let client = self.ensure_connected().await.map_err(classify)?;

        let browser_context_id = client.create_browser_context().await.map_err(classify)?;

        let channel = match client.create_page(&browser_context_id).await {
            Ok(channel) => Arc::new(channel),
            Err(e) => {
                // Context without a page is useless; release it right away.
                let _ = client.dispose_browser_context(&browser_context_id).await;
                return Err(classify(e));
            }
        };

        if let Err(e) = self.configure_page(&channel, &viewport).await {
            let _ = client.dispose_browser_context(&browser_context_id).await;
            return Err(classify(e));
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.contexts
            .write()
            .await
            .insert(id.clone(), browser_context_id.clone());

        debug!(
            "Created session {} for {} ({} context {})",
            id,
            url,
            viewport.label(),
            browser_context_id
        );

        Ok(RenderingSession::new(
            id,
            browser_context_id,
            url.to_string(),
            viewport,
            self.profile.clone(),
            channel,
            permit,
        ))
    }

    /// Apply emulation and throttling to a fresh page.
    async fn configure_page(
        &self,
        channel: &PageChannel,
        viewport: &ViewportProfile,
    ) -> Result<(), CdpError> {
        channel.enable_domains().await?;

        channel
            .call(
                "Emulation.setDeviceMetricsOverride",
                Some(json!({
                    "width": viewport.width,
                    "height": viewport.height,
                    "deviceScaleFactor": viewport.device_scale_factor,
                    "mobile": viewport.is_mobile,
                })),
            )
            .await?;

        channel
            .call(
                "Emulation.setTouchEmulationEnabled",
                Some(json!({"enabled": viewport.has_touch})),
            )
            .await?;

        channel
            .call(
                "Emulation.setUserAgentOverride",
                Some(json!({"userAgent": viewport.effective_user_agent()})),
            )
            .await?;

        // Fixed locale/timezone so text measurement and date rendering are
        // deterministic across hosts.
        channel
            .call("Emulation.setLocaleOverride", Some(json!({"locale": "en-US"})))
            .await?;
        channel
            .call(
                "Emulation.setTimezoneOverride",
                Some(json!({"timezoneId": "UTC"})),
            )
            .await?;

        channel
            .call(
                "Emulation.setEmulatedMedia",
                Some(json!({
                    "features": [{"name": "prefers-reduced-motion", "value": "reduce"}]
                })),
            )
            .await?;

        channel
            .call(
                "Emulation.setCPUThrottlingRate",
                Some(json!({"rate": self.profile.cpu_throttle_rate})),
            )
            .await?;

        channel
            .call(
                "Network.emulateNetworkConditions",
                Some(json!({
                    "offline": false,
                    "latency": self.profile.network_latency_ms,
                    "downloadThroughput": self.profile.download_throughput,
                    "uploadThroughput": self.profile.upload_throughput,
                })),
            )
            .await?;

        Ok(())
    }

    /// Close one session's browsing context. Idempotent; never fails — a
    /// context that is already gone is a success.
    pub async fn close(&self, session: &RenderingSession) {
        let removed = self.contexts.write().await.remove(&session.id);
        let Some(browser_context_id) = removed else {
            return;
        };

        session.cleanup_page_state().await;

        if let Some(client) = self.client.read().await.clone() {
            if let Err(e) = client.dispose_browser_context(&browser_context_id).await {
                warn!("Failed to dispose context {}: {}", browser_context_id, e);
            }
        }
        debug!("Closed session {}", session.id);
    }

    /// Close every open context and shut the browser process down.
    /// Idempotent.
    pub async fn close_all(&self) {
        let contexts: Vec<(String, String)> =
            self.contexts.write().await.drain().collect();

        if let Some(client) = self.client.write().await.take() {
            for (session_id, context_id) in contexts {
                if let Err(e) = client.dispose_browser_context(&context_id).await {
                    warn!("Failed to dispose context for session {}: {}", session_id, e);
                }
            }
        }

        if let Some(mut child) = self.chrome_process.lock().await.take() {
            info!("Shutting down browser process");
            let _ = child.kill().await;
        }
        self.profile_dir.lock().await.take();
    }

    /// Number of currently open contexts.
    pub async fn open_contexts(&self) -> usize {
        self.contexts.read().await.len()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
