//! Chrome process discovery and launch.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::cdp::CdpError;

/// Configuration for the shared browser process.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Remote debugging port.
    pub debug_port: u16,
    /// Explicit browser binary, overriding discovery.
    pub binary: Option<PathBuf>,
    /// Run headless. On for the extraction service; off is only useful when
    /// debugging locally.
    pub headless: bool,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            binary: None,
            headless: true,
        }
    }
}

impl ChromeConfig {
    /// The CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}

/// Find a Chrome/Chromium executable on this host.
pub fn find_chrome() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Bound on each `/json/version` request, so a half-open endpoint cannot
/// stall callers waiting on discovery.
pub(crate) const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Whether a browser is already answering on the debug port.
pub async fn is_running(config: &ChromeConfig) -> bool {
    let Ok(client) = reqwest::Client::builder().timeout(DISCOVERY_TIMEOUT).build() else {
        return false;
    };
    client
        .get(format!("{}/json/version", config.endpoint()))
        .send()
        .await
        .is_ok()
}

/// Launch Chrome with remote debugging into a throwaway profile. The temp
/// dir must outlive the process; the caller keeps it alongside the child.
pub async fn launch(
    config: &ChromeConfig,
    profile_dir: &std::path::Path,
) -> Result<Child, CdpError> {
    let chrome_path = config
        .binary
        .clone()
        .or_else(find_chrome)
        .ok_or_else(|| CdpError::BrowserNotAvailable("no Chrome/Chromium binary found".into()))?;

    info!(
        "Launching {} on port {} (profile {})",
        chrome_path.display(),
        config.debug_port,
        profile_dir.display()
    );

    let mut cmd = Command::new(&chrome_path);
    cmd.arg(format!("--remote-debugging-port={}", config.debug_port))
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--disable-extensions")
        .arg("--mute-audio")
        .arg("--metrics-recording-only")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if config.headless {
        cmd.arg("--headless=new");
    }

    let child = cmd
        .spawn()
        .map_err(|e| CdpError::ConnectionFailed(format!("failed to launch Chrome: {}", e)))?;

    info!("Chrome launched with PID: {:?}", child.id());

    // Wait for the debugging endpoint to come up.
    let mut attempts = 0;
    let max_attempts = 50;
    while attempts < max_attempts {
        tokio::time::sleep(Duration::from_millis(200)).await;
        if is_running(config).await {
            return Ok(child);
        }
        attempts += 1;
    }

    warn!("Chrome did not answer on {} in time", config.endpoint());
    Err(CdpError::BrowserNotAvailable(
        "Chrome failed to start within timeout".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChromeConfig::default();
        assert_eq!(config.debug_port, 9222);
        assert!(config.headless);
        assert_eq!(config.endpoint(), "http://localhost:9222");
    }

    #[test]
    fn endpoint_follows_port() {
        let config = ChromeConfig { debug_port: 9500, ..Default::default() };
        assert_eq!(config.endpoint(), "http://localhost:9500");
    }
}
