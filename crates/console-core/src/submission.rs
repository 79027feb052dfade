//! ============================================================================
//! Submission Form - collect, validate and submit a new report
//! ============================================================================

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock;
use crate::types::{ConsoleError, ConsoleResult, ControlState, NewReport, Reaction};

/// Alert when a required field is blank
pub const REQUIRED_FIELDS_ALERT: &str = "Please fill required fields";

/// Steps for bringing the backend up, shown on transport failure
pub const BACKEND_RUNBOOK: &[&str] = &[
    "cd backend",
    "python -m venv .venv",
    ". .venv/bin/activate",
    "pip install -r requirements.txt",
    "python app.py",
];

/// Build a reference id `SC-YYYYMMDD-NNNN` for `date`
pub fn generate_ref_id_at<R: Rng>(date: NaiveDate, rng: &mut R) -> String {
    let suffix: u16 = rng.gen_range(1000..=9999);
    format!("SC-{}-{}", date.format("%Y%m%d"), suffix)
}

/// Reference id for today's local date
pub fn generate_ref_id() -> String {
    generate_ref_id_at(Local::now().date_naive(), &mut rand::thread_rng())
}

/// Editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    City,
    Area,
    Street,
    IssueType,
    Description,
    Email,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "city" => Ok(FormField::City),
            "area" => Ok(FormField::Area),
            "street" => Ok(FormField::Street),
            "issue_type" | "issue-type" | "issuetype" | "type" => Ok(FormField::IssueType),
            "description" | "desc" => Ok(FormField::Description),
            "email" => Ok(FormField::Email),
            _ => Err(format!("Unknown form field '{}'", s)),
        }
    }
}

/// Raw field values as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub city: String,
    pub area: String,
    pub street: String,
    pub issue_type: String,
    pub description: String,
    pub email: String,
}

impl ReportForm {
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::City => self.city = value,
            FormField::Area => self.area = value,
            FormField::Street => self.street = value,
            FormField::IssueType => self.issue_type = value,
            FormField::Description => self.description = value,
            FormField::Email => self.email = value,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Trimmed payload, or `None` when a required field is blank
    pub fn to_payload(&self, ref_id: String, timestamp: String) -> Option<NewReport> {
        let payload = NewReport {
            ref_id,
            city: self.city.trim().to_string(),
            area: self.area.trim().to_string(),
            street: self.street.trim().to_string(),
            issue_type: self.issue_type.trim().to_string(),
            description: self.description.trim().to_string(),
            email: self.email.trim().to_string(),
            timestamp,
        };
        let complete = [&payload.city, &payload.area, &payload.street, &payload.email]
            .iter()
            .all(|v| !v.is_empty());
        complete.then_some(payload)
    }
}

/// Result panel under the form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPanel {
    Submitted {
        ref_id: String,
        /// Pretty-printed response echo
        response: String,
        email: String,
    },
    Failed {
        message: String,
        /// Pretty-printed raw body
        body: String,
    },
    Unreachable {
        error: String,
    },
}

/// Submission form state
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub form: ReportForm,
    state: ControlState,
    panel: Option<SubmissionPanel>,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn panel(&self) -> Option<&SubmissionPanel> {
        self.panel.as_ref()
    }

    /// Validate and build the payload; the error is the alert to show
    pub fn begin_submit(&mut self) -> Result<NewReport, String> {
        let payload = self
            .form
            .to_payload(generate_ref_id(), clock::now_iso())
            .ok_or_else(|| {
                debug!("Submission blocked: required field missing");
                REQUIRED_FIELDS_ALERT.to_string()
            })?;
        self.state = ControlState::InFlight;
        Ok(payload)
    }

    pub fn apply_submit(&mut self, payload: &NewReport, result: ConsoleResult<Value>) -> Reaction {
        match result {
            Ok(body) => {
                let ref_id = body
                    .get("ref_id")
                    .and_then(Value::as_str)
                    .unwrap_or(&payload.ref_id)
                    .to_string();
                info!("Report submitted: {}", ref_id);
                self.panel = Some(SubmissionPanel::Submitted {
                    ref_id,
                    response: pretty(&body),
                    email: payload.email.clone(),
                });
                self.state = ControlState::SuccessShown;
                self.form.reset();
                Reaction::refresh()
            }
            Err(ConsoleError::Application { message, body, .. }) => {
                warn!("Submission of {} failed: {}", payload.ref_id, message);
                self.panel = Some(SubmissionPanel::Failed {
                    message,
                    body: pretty(&body),
                });
                self.state = ControlState::ErrorShown;
                Reaction::default()
            }
            Err(e) => {
                warn!("Submission of {} could not reach backend: {}", payload.ref_id, e);
                self.panel = Some(SubmissionPanel::Unreachable { error: e.to_string() });
                self.state = ControlState::ErrorShown;
                Reaction::default()
            }
        }
    }

    /// Clear button
    pub fn clear(&mut self) {
        self.form.reset();
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
