//! ============================================================================
//! Core Types for the Report Console
//! ============================================================================
//! Wire types for the reports backend, the two error classes every handler
//! distinguishes, and the per-control state machine shared by all panels.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// A street light issue report as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub ref_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub area: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issue_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    /// Client clock at submission
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Server-assigned, never set by the console. Missing or null is unknown.
    #[serde(default)]
    pub status: ReportStatus,
    /// Server-assigned, display only
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Text columns the backend may send as `null`
fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Report lifecycle status (server-assigned)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Open,
    Verified,
    /// Anything else the backend sends; rendered verbatim, never acceptable
    Other(String),
}

/// Label for a report the backend sent without a status
pub const UNKNOWN_STATUS: &str = "unknown";

impl Default for ReportStatus {
    fn default() -> Self {
        ReportStatus::Other(UNKNOWN_STATUS.to_string())
    }
}

impl ReportStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::Verified => "verified",
            ReportStatus::Other(s) => s,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ReportStatus::Open)
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, ReportStatus::Verified)
    }
}

impl From<&str> for ReportStatus {
    fn from(s: &str) -> Self {
        match s {
            "open" => ReportStatus::Open,
            "verified" => ReportStatus::Verified,
            other => ReportStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReportStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReportStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| ReportStatus::from(s.as_str())).unwrap_or_default())
    }
}

/// Payload for POST /issues (report fields minus status/created_at)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewReport {
    pub ref_id: String,
    pub city: String,
    pub area: String,
    pub street: String,
    pub issue_type: String,
    pub description: String,
    pub email: String,
    pub timestamp: String,
}

/// Body for POST /issues/{ref_id}/accept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptRequest {
    pub action_notes: String,
}

/// Success body of the accept endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AcceptResponse {
    #[serde(default)]
    pub suggested_actions: Option<Vec<String>>,
}

/// Body for POST /sensor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub ref_id: String,
    /// `None` serializes as `null` when the entered value is not a number
    pub lux: Option<f64>,
    pub timestamp: String,
}

/// Success body of the sensor endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub debug: Option<SensorDebug>,
    #[serde(default)]
    pub suggested_actions: Option<Vec<String>>,
}

/// Server-side interpretation of a reading
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SensorDebug {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// Body of GET /health
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub db: Option<bool>,
}

impl HealthResponse {
    /// Operational flag AND storage connectivity flag
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("ok") && self.db == Some(true)
    }
}

/// Per-control state. There is no queued or retry state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    #[default]
    Idle,
    InFlight,
    SuccessShown,
    ErrorShown,
}

/// What a panel asks of the console after applying a result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Blocking user-facing message
    pub alert: Option<String>,
    /// Re-fetch the report list
    pub refresh_reports: bool,
}

impl Reaction {
    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            alert: Some(message.into()),
            refresh_reports: false,
        }
    }

    pub fn refresh() -> Self {
        Self {
            alert: None,
            refresh_reports: true,
        }
    }
}

/// Error types for backend calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    /// Network unreachable, request rejected, or undecodable body
    #[error("{0}")]
    Transport(String),

    /// Response received but it reports failure
    #[error("{message}")]
    Application {
        status: u16,
        message: String,
        /// Raw decoded body (`null` when it was not JSON)
        body: serde_json::Value,
    },

    #[error("File error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ConsoleError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ConsoleError::Transport(_))
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        ConsoleError::Transport(e.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Serialization(e.to_string())
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_status_round_trip() {
        let report: Report = serde_json::from_value(serde_json::json!({
            "ref_id": "SC-1",
            "street": "Elm Street",
            "status": "verified"
        }))
        .unwrap();
        assert!(report.status.is_verified());
        assert_eq!(report.city, "");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "verified");
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let report: Report =
            serde_json::from_value(serde_json::json!({"ref_id": "SC-2", "status": "closed"}))
                .unwrap();
        assert_eq!(report.status, ReportStatus::Other("closed".into()));
        assert!(!report.status.is_open());
        assert_eq!(report.status.to_string(), "closed");
    }

    #[test]
    fn test_null_text_columns_decode_empty() {
        let reports: Vec<Report> = serde_json::from_value(serde_json::json!([{
            "ref_id": "SC-1",
            "street": "Elm",
            "status": "open",
            "issue_type": null,
            "description": null,
            "email": null
        }]))
        .unwrap();
        assert_eq!(reports[0].description, "");
        assert_eq!(reports[0].issue_type, "");
        assert_eq!(reports[0].street, "Elm");
        assert!(reports[0].status.is_open());
    }

    #[test]
    fn test_missing_or_null_status_is_not_open() {
        let missing: Report =
            serde_json::from_value(serde_json::json!({"ref_id": "SC-1"})).unwrap();
        let null: Report =
            serde_json::from_value(serde_json::json!({"ref_id": "SC-2", "status": null})).unwrap();
        for report in [missing, null] {
            assert_eq!(report.status, ReportStatus::Other(UNKNOWN_STATUS.into()));
            assert!(!report.status.is_open());
        }
    }

    #[test]
    fn test_health_requires_both_flags() {
        let ok = HealthResponse { status: Some("ok".into()), db: Some(true) };
        let no_db = HealthResponse { status: Some("ok".into()), db: Some(false) };
        let degraded = HealthResponse { status: Some("degraded".into()), db: Some(true) };
        assert!(ok.is_healthy());
        assert!(!no_db.is_healthy());
        assert!(!degraded.is_healthy());
        assert!(!HealthResponse::default().is_healthy());
    }

    #[test]
    fn test_non_numeric_lux_serializes_null() {
        let reading = SensorReading {
            ref_id: "SC-1".into(),
            lux: None,
            timestamp: "2024-01-01T00:00:00.000Z".into(),
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert!(json["lux"].is_null());
    }
}
