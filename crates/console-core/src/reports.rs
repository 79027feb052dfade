//! ============================================================================
//! Report List View - current reports with per-row Accept / View actions
//! ============================================================================
//! Rows are kept in display order (newest first: the reverse of what the
//! backend returns). Accept buttons are enabled only for open, not yet
//! accepted rows while the health gate is open.
//! ============================================================================

use tracing::{debug, info};

use crate::types::{AcceptResponse, ConsoleError, ConsoleResult, ControlState, Reaction, Report};

/// Placeholder shown when the list cannot be fetched
pub const REPORTS_UNAVAILABLE: &str = "Backend not running (reports unavailable)";

/// Placeholder for an empty list
pub const NO_REPORTS: &str = "No reports yet";

/// Alert for transport failures on row actions
pub const ACTION_UNREACHABLE: &str = "Backend not reachable — ensure the backend server is running.";

/// Alert for transport failures when viewing details
pub const DETAIL_UNREACHABLE: &str = "Backend unreachable — ensure the backend server is running.";

/// Static checklist appended to verified report details
pub const STANDARD_SOLUTION: &[&str] = &["Raise priority", "Assign maintenance", "Schedule repair"];

/// One rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub report: Report,
    /// Accepted from this console since the last render
    pub accepted: bool,
    pub accept_state: ControlState,
}

impl ReportRow {
    fn new(report: Report) -> Self {
        Self {
            report,
            accepted: false,
            accept_state: ControlState::Idle,
        }
    }

    /// Whether the row shows an Accept action at all
    pub fn has_accept(&self) -> bool {
        self.report.status.is_open()
    }
}

/// Contents of the solution box shared by Accept and View
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionPanel {
    Accepted {
        ref_id: String,
        suggested_actions: Vec<String>,
    },
    Details {
        ref_id: String,
        street: String,
        status: String,
        reported: String,
        /// Static remediation checklist for verified reports
        checklist: Option<Vec<String>>,
    },
}

/// Report list state
#[derive(Debug, Clone)]
pub struct ReportListView {
    rows: Vec<ReportRow>,
    placeholder: Option<String>,
    list_state: ControlState,
    /// Health gating for Accept buttons
    accept_gate: bool,
    solution: Option<SolutionPanel>,
    detail_state: ControlState,
}

impl Default for ReportListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportListView {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            placeholder: Some(NO_REPORTS.to_string()),
            list_state: ControlState::Idle,
            accept_gate: true,
            solution: None,
            detail_state: ControlState::Idle,
        }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn list_state(&self) -> ControlState {
        self.list_state
    }

    pub fn detail_state(&self) -> ControlState {
        self.detail_state
    }

    pub fn solution(&self) -> Option<&SolutionPanel> {
        self.solution.as_ref()
    }

    pub fn row(&self, ref_id: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.report.ref_id == ref_id)
    }

    fn row_mut(&mut self, ref_id: &str) -> Option<&mut ReportRow> {
        self.rows.iter_mut().find(|r| r.report.ref_id == ref_id)
    }

    /// Open or close the health gate on every Accept button
    pub fn set_accept_gate(&mut self, enabled: bool) {
        self.accept_gate = enabled;
    }

    /// Whether the row's Accept button is clickable
    pub fn accept_enabled(&self, row: &ReportRow) -> bool {
        self.accept_gate && row.has_accept() && !row.accepted
    }

    pub fn begin_fetch(&mut self) {
        self.list_state = ControlState::InFlight;
    }

    /// Render a freshly fetched collection, newest first
    pub fn apply_reports(&mut self, reports: Vec<Report>) {
        debug!("Rendering {} reports", reports.len());
        self.rows = reports.into_iter().rev().map(ReportRow::new).collect();
        self.placeholder = if self.rows.is_empty() {
            Some(NO_REPORTS.to_string())
        } else {
            None
        };
        self.list_state = ControlState::SuccessShown;
    }

    /// Replace the list with the unavailable placeholder
    pub fn apply_fetch_error(&mut self, error: &ConsoleError) {
        debug!("Report list unavailable: {}", error);
        self.rows.clear();
        self.placeholder = Some(REPORTS_UNAVAILABLE.to_string());
        self.list_state = ControlState::ErrorShown;
    }

    /// Check that an Accept click on `ref_id` would do anything
    pub fn check_accept(&self, ref_id: &str) -> Result<(), String> {
        let row = self
            .row(ref_id)
            .ok_or_else(|| format!("Report {} is not in the list", ref_id))?;
        if !row.has_accept() {
            return Err(format!("Report {} is not open", ref_id));
        }
        if row.accepted {
            return Err(format!("Report {} was already accepted", ref_id));
        }
        if !self.accept_gate {
            return Err("Accept is disabled while the backend is offline".to_string());
        }
        Ok(())
    }

    pub fn begin_accept(&mut self, ref_id: &str) {
        if let Some(row) = self.row_mut(ref_id) {
            row.accept_state = ControlState::InFlight;
        }
    }

    pub fn apply_accept(&mut self, ref_id: &str, result: ConsoleResult<AcceptResponse>) -> Reaction {
        match result {
            Ok(response) => {
                info!("Report {} accepted", ref_id);
                if let Some(row) = self.row_mut(ref_id) {
                    row.accepted = true;
                    row.accept_state = ControlState::SuccessShown;
                }
                self.solution = Some(SolutionPanel::Accepted {
                    ref_id: ref_id.to_string(),
                    suggested_actions: response.suggested_actions.unwrap_or_default(),
                });
                Reaction::refresh()
            }
            Err(e) => {
                if let Some(row) = self.row_mut(ref_id) {
                    row.accept_state = ControlState::ErrorShown;
                }
                match e {
                    ConsoleError::Application { message, .. } => Reaction::alert(message),
                    _ => Reaction::alert(ACTION_UNREACHABLE),
                }
            }
        }
    }

    pub fn begin_view(&mut self) {
        self.detail_state = ControlState::InFlight;
    }

    pub fn apply_detail(&mut self, result: ConsoleResult<Report>) -> Reaction {
        match result {
            Ok(report) => {
                let reported = report
                    .created_at
                    .as_deref()
                    .map(crate::clock::display_or_raw)
                    .unwrap_or_else(|| "unknown".to_string());
                let checklist = report
                    .status
                    .is_verified()
                    .then(|| STANDARD_SOLUTION.iter().map(|s| s.to_string()).collect());
                self.solution = Some(SolutionPanel::Details {
                    ref_id: report.ref_id,
                    street: report.street,
                    status: report.status.to_string(),
                    reported,
                    checklist,
                });
                self.detail_state = ControlState::SuccessShown;
                Reaction::default()
            }
            Err(ConsoleError::Application { .. }) => {
                self.detail_state = ControlState::ErrorShown;
                Reaction::alert("Could not fetch report details")
            }
            Err(_) => {
                self.detail_state = ControlState::ErrorShown;
                Reaction::alert(DETAIL_UNREACHABLE)
            }
        }
    }
}
