//! ============================================================================
//! Health Monitor - Backend liveness indicator
//! ============================================================================
//! Owns the online/offline indicator, the banners, and the manual
//! "simulate offline" override:
//! - `set_server_status` is the only place status is decided
//! - the override forces offline no matter what the probe said
//! - becoming healthy shows a "back online" banner on a dismissal timer
//! ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::types::{ConsoleResult, HealthResponse};

/// Reason recorded while the override is active
pub const SIMULATED_OFFLINE_REASON: &str = "Simulated offline";

/// Startup hint shown when the backend cannot be reached
pub const BACKEND_START_HINT: &str = "Run `python app.py` in backend";

/// Line shown next to the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    /// No status decided yet
    Checking,
    Online,
    Unreachable,
    SimulatedOffline,
}

impl ServerMessage {
    pub fn text(&self) -> String {
        match self {
            ServerMessage::Checking => "Checking backend...".to_string(),
            ServerMessage::Online => "Backend is online".to_string(),
            ServerMessage::Unreachable => format!("Backend unreachable — {}", BACKEND_START_HINT),
            ServerMessage::SimulatedOffline => "Backend unreachable — Simulated offline mode".to_string(),
        }
    }
}

/// Transient "back online" banner with a cancellable dismissal task.
/// Visibility is published on a watch channel so a renderer can redraw
/// when the dismissal fires.
pub struct OnlineBanner {
    visible: Arc<watch::Sender<bool>>,
    dismissal: Option<JoinHandle<()>>,
    ttl: Duration,
}

impl OnlineBanner {
    pub fn new(ttl: Duration) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            visible: Arc::new(visible),
            dismissal: None,
            ttl,
        }
    }

    /// Show the banner and (re)arm its dismissal. Must run inside a tokio runtime.
    pub fn show(&mut self) {
        self.cancel_dismissal();
        self.visible.send_replace(true);

        let visible = Arc::clone(&self.visible);
        let ttl = self.ttl;
        self.dismissal = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            visible.send_replace(false);
            debug!("Online banner dismissed");
        }));
    }

    pub fn hide(&mut self) {
        self.cancel_dismissal();
        self.visible.send_replace(false);
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Receiver notified on every visibility change
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }

    /// Whether a dismissal is still pending
    pub fn is_armed(&self) -> bool {
        self.dismissal.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    fn cancel_dismissal(&mut self) {
        if let Some(handle) = self.dismissal.take() {
            handle.abort();
        }
    }
}

impl Drop for OnlineBanner {
    fn drop(&mut self) {
        self.cancel_dismissal();
    }
}

/// Turn one probe result into (healthy, reason)
pub fn evaluate_probe(result: &ConsoleResult<HealthResponse>) -> (bool, Option<String>) {
    match result {
        Ok(health) if health.is_healthy() => (true, None),
        Ok(health) => (
            false,
            Some(format!(
                "Backend degraded (status: {}, db: {})",
                health.status.as_deref().unwrap_or("unknown"),
                health.db.map(|d| d.to_string()).unwrap_or_else(|| "unknown".into())
            )),
        ),
        Err(e) => (false, Some(e.to_string())),
    }
}

/// Backend status indicator and offline override
pub struct HealthMonitor {
    simulate_offline: bool,
    /// `None` until the first status is rendered
    online: Option<bool>,
    reason: Option<String>,
    message: ServerMessage,
    offline_banner: bool,
    online_banner: OnlineBanner,
}

impl HealthMonitor {
    pub fn new(online_banner_ttl: Duration) -> Self {
        Self {
            simulate_offline: false,
            online: None,
            reason: None,
            message: ServerMessage::Checking,
            offline_banner: false,
            online_banner: OnlineBanner::new(online_banner_ttl),
        }
    }

    /// Render a status and return the effective reachability.
    /// The override wins over `ok`.
    pub fn set_server_status(&mut self, ok: bool, reason: Option<String>) -> bool {
        if self.simulate_offline {
            self.online = Some(false);
            self.reason = Some(reason.unwrap_or_else(|| SIMULATED_OFFLINE_REASON.to_string()));
            self.message = ServerMessage::SimulatedOffline;
            self.offline_banner = true;
            return false;
        }

        let was_online = self.online == Some(true);
        if ok {
            self.online = Some(true);
            self.reason = None;
            self.message = ServerMessage::Online;
            self.offline_banner = false;
            if !was_online {
                info!("Backend is online");
                self.online_banner.show();
            }
        } else {
            if was_online || self.online.is_none() {
                warn!(
                    "Backend unreachable: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
            }
            self.online = Some(false);
            // Keep the previous reason when none is given
            if reason.is_some() {
                self.reason = reason;
            }
            self.message = ServerMessage::Unreachable;
            self.offline_banner = true;
            self.online_banner.hide();
        }
        ok
    }

    /// Flip the override; returns the new value
    pub fn toggle_simulate_offline(&mut self) -> bool {
        self.simulate_offline = !self.simulate_offline;
        if self.simulate_offline {
            info!("Simulated offline mode enabled");
            self.offline_banner = true;
            self.online_banner.hide();
        } else {
            info!("Simulated offline mode disabled");
            self.offline_banner = false;
        }
        self.simulate_offline
    }

    pub fn is_simulating_offline(&self) -> bool {
        self.simulate_offline
    }

    /// Displayed reachability; unknown counts as online until the first check
    pub fn is_online(&self) -> bool {
        self.online.unwrap_or(true) && !self.simulate_offline
    }

    pub fn status_known(&self) -> bool {
        self.online.is_some()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn message(&self) -> ServerMessage {
        self.message
    }

    pub fn offline_banner_visible(&self) -> bool {
        self.offline_banner
    }

    pub fn online_banner_visible(&self) -> bool {
        self.online_banner.is_visible()
    }

    pub fn online_banner(&self) -> &OnlineBanner {
        &self.online_banner
    }

    /// Indicator text
    pub fn indicator(&self) -> &'static str {
        match (self.simulate_offline, self.online) {
            (true, _) => "Server: offline (simulated)",
            (false, None) => "Server: checking",
            (false, Some(true)) => "Server: online",
            (false, Some(false)) => "Server: offline",
        }
    }

    /// Label of the override toggle
    pub fn toggle_label(&self) -> &'static str {
        if self.simulate_offline {
            "Simulated: offline (click to resume)"
        } else {
            "Simulate offline"
        }
    }
}
