//! ============================================================================
//! Sensor Simulator - post a synthetic light reading for a report
//! ============================================================================
//! Only the reference id is checked client-side; whether it exists is up to
//! the backend.
//! ============================================================================

use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::clock;
use crate::types::{
    ConsoleError, ConsoleResult, ControlState, Reaction, SensorReading, SensorResponse,
};

/// Alert when no reference id was entered
pub const MISSING_REF_ALERT: &str = "Enter ref id to target a report";

/// Coerce the lux field to a number: blank is 0, anything non-numeric is `None`
pub fn coerce_lux(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Simulator input fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorField {
    RefId,
    Lux,
    Timestamp,
}

impl FromStr for SensorField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ref" | "ref_id" | "sim_ref" | "simref" => Ok(SensorField::RefId),
            "lux" => Ok(SensorField::Lux),
            "timestamp" | "time" | "ts" => Ok(SensorField::Timestamp),
            _ => Err(format!("Unknown sensor field '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorFields {
    pub ref_id: String,
    pub lux: String,
    pub timestamp: String,
}

impl SensorFields {
    pub fn set(&mut self, field: SensorField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SensorField::RefId => self.ref_id = value,
            SensorField::Lux => self.lux = value,
            SensorField::Timestamp => self.timestamp = value,
        }
    }
}

/// Result panel of the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum SensorPanel {
    Result {
        message: String,
        lux: Option<f64>,
        /// Local rendering of what was sent
        sent_at: String,
        /// Only when the server timestamp parsed
        server_time: Option<String>,
        verified: Option<bool>,
        suggested_actions: Vec<String>,
    },
    Unreachable {
        error: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SensorSimulator {
    pub fields: SensorFields,
    state: ControlState,
    panel: Option<SensorPanel>,
}

impl SensorSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn panel(&self) -> Option<&SensorPanel> {
        self.panel.as_ref()
    }

    /// Build the reading; the error is the alert to show
    pub fn begin_send(&mut self) -> Result<SensorReading, String> {
        let ref_id = self.fields.ref_id.trim();
        if ref_id.is_empty() {
            debug!("Sensor reading blocked: no reference id");
            return Err(MISSING_REF_ALERT.to_string());
        }
        let timestamp = if self.fields.timestamp.is_empty() {
            clock::now_iso()
        } else {
            self.fields.timestamp.clone()
        };
        let reading = SensorReading {
            ref_id: ref_id.to_string(),
            lux: coerce_lux(&self.fields.lux),
            timestamp,
        };
        self.state = ControlState::InFlight;
        Ok(reading)
    }

    pub fn apply_send(
        &mut self,
        reading: &SensorReading,
        result: ConsoleResult<SensorResponse>,
    ) -> Reaction {
        match result {
            Ok(response) => {
                let processed = response.debug.unwrap_or_default();
                // Best effort: a malformed server timestamp is dropped
                let server_time = processed.timestamp.as_deref().and_then(clock::display_local);
                info!(
                    "Sensor reading for {} processed (verified: {:?})",
                    reading.ref_id, processed.verified
                );
                self.panel = Some(SensorPanel::Result {
                    message: response.message.unwrap_or_default(),
                    lux: reading.lux,
                    sent_at: clock::display_or_raw(&reading.timestamp),
                    server_time,
                    verified: processed.verified,
                    suggested_actions: response.suggested_actions.unwrap_or_default(),
                });
                self.state = ControlState::SuccessShown;
                Reaction::refresh()
            }
            Err(ConsoleError::Application { message, .. }) => {
                warn!("Sensor reading for {} rejected: {}", reading.ref_id, message);
                self.state = ControlState::ErrorShown;
                Reaction::alert(message)
            }
            Err(e) => {
                warn!("Sensor reading for {} could not reach backend: {}", reading.ref_id, e);
                self.panel = Some(SensorPanel::Unreachable { error: e.to_string() });
                self.state = ControlState::ErrorShown;
                Reaction::default()
            }
        }
    }
}
