//! ============================================================================
//! Console Configuration
//! ============================================================================
//! Defaults come from environment variables (loaded from `.env` by the CLI);
//! command-line flags override them through the `with_*` setters.
//! ============================================================================

use std::path::PathBuf;
use std::time::Duration;

/// Backend base path used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";

/// Fixed health poll period
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 8000;

/// How long the "back online" banner stays up
pub const ONLINE_BANNER_TTL_MS: u64 = 4000;

/// File name the bulk export is saved under
pub const DEFAULT_EXPORT_FILE: &str = "issues.json";

/// Poll period for `ms`; zero is not a usable period
pub fn health_interval_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Console configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub api_base: String,
    pub health_interval: Duration,
    pub online_banner_ttl: Duration,
    pub export_path: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: std::env::var("REPORT_CONSOLE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            health_interval: std::env::var("REPORT_CONSOLE_HEALTH_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .and_then(health_interval_from_ms)
                .unwrap_or(Duration::from_millis(DEFAULT_HEALTH_INTERVAL_MS)),
            online_banner_ttl: Duration::from_millis(ONLINE_BANNER_TTL_MS),
            export_path: std::env::var("REPORT_CONSOLE_EXPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EXPORT_FILE)),
        }
    }
}

impl ConsoleConfig {
    /// Config pointing at an explicit backend, other fields at their defaults
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            health_interval: Duration::from_millis(DEFAULT_HEALTH_INTERVAL_MS),
            online_banner_ttl: Duration::from_millis(ONLINE_BANNER_TTL_MS),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Base URL without a trailing slash
    pub fn normalized_base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }
}
