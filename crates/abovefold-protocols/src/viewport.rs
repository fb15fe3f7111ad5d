//! Viewport profiles and the two canonical presets.

use serde::{Deserialize, Serialize};

/// An immutable viewport description supplied per extraction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportProfile {
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
    /// Device scale factor (device pixel ratio).
    pub device_scale_factor: f64,
    /// Whether to emulate a mobile device.
    pub is_mobile: bool,
    /// Whether to enable touch event emulation.
    pub has_touch: bool,
    /// Optional user-agent override. When absent, a UA is derived from
    /// `is_mobile`.
    pub user_agent: Option<String>,
}

impl ViewportProfile {
    /// Canonical mobile preset.
    pub fn mobile() -> Self {
        Self {
            width: 360,
            height: 640,
            device_scale_factor: 2.625,
            is_mobile: true,
            has_touch: true,
            user_agent: None,
        }
    }

    /// Canonical desktop preset.
    pub fn desktop() -> Self {
        Self {
            width: 1366,
            height: 768,
            device_scale_factor: 1.0,
            is_mobile: false,
            has_touch: false,
            user_agent: None,
        }
    }

    /// Short label used in logs and results ("mobile"/"desktop"/"custom").
    /// Ignores the user-agent override so an overridden preset keeps its name.
    pub fn label(&self) -> &'static str {
        let mobile = Self::mobile();
        let desktop = Self::desktop();
        if (self.width, self.height, self.is_mobile) == (mobile.width, mobile.height, true) {
            "mobile"
        } else if (self.width, self.height, self.is_mobile) == (desktop.width, desktop.height, false) {
            "desktop"
        } else {
            "custom"
        }
    }

    /// The effective user agent for this viewport.
    pub fn effective_user_agent(&self) -> String {
        if let Some(ua) = &self.user_agent {
            return ua.clone();
        }
        if self.is_mobile {
            "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36"
                .to_string()
        } else {
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string()
        }
    }

    /// Same profile with a different user-agent override.
    pub fn with_user_agent(mut self, ua: Option<String>) -> Self {
        if ua.is_some() {
            self.user_agent = ua;
        }
        self
    }
}
