//! ============================================================================
//! Text rendering for the console panels
//! ============================================================================
//! Every panel renders to a block of lines ending in a newline; an empty
//! panel renders to an empty string.
//! ============================================================================

use crate::console::{Console, Controls, Panel};
use crate::health::HealthMonitor;
use crate::reports::{ReportListView, ReportRow, SolutionPanel};
use crate::sensor::SensorPanel;
use crate::submission::{SubmissionPanel, BACKEND_RUNBOOK};
use crate::types::{ControlState, ReportStatus};

fn block(lines: Vec<String>) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn badge(status: &ReportStatus) -> String {
    match status {
        ReportStatus::Open => "[open]".to_string(),
        ReportStatus::Verified => "(verified)".to_string(),
        // Unknown statuses borrow the open style
        ReportStatus::Other(raw) => format!("[{}]", raw),
    }
}

fn switch(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn busy(state: ControlState) -> &'static str {
    match state {
        ControlState::InFlight => " (working...)",
        _ => "",
    }
}

pub fn render_status(health: &HealthMonitor) -> String {
    let mut lines = vec![format!("{}  |  {}", health.indicator(), health.message().text())];
    if let Some(reason) = health.reason() {
        lines.push(format!("  reason: {}", reason));
    }
    if health.offline_banner_visible() {
        lines.push("  !! Backend offline: actions are disabled".to_string());
    }
    if health.online_banner_visible() {
        lines.push("  ** Backend is back online".to_string());
    }
    lines.push(format!("  [{}]", health.toggle_label()));
    block(lines)
}

/// Action column for one row
pub fn row_actions(view: &ReportListView, row: &ReportRow) -> String {
    let accept = if !row.has_accept() {
        None
    } else if row.accepted {
        Some("Accepted")
    } else if view.accept_enabled(row) {
        Some(match row.accept_state {
            ControlState::InFlight => "Accepting...",
            _ => "Accept",
        })
    } else {
        Some("Accept (disabled)")
    };
    match accept {
        Some(accept) => format!("{} | View", accept),
        None => "View".to_string(),
    }
}

pub fn render_reports(view: &ReportListView) -> String {
    let mut lines = vec![format!("=== Reports{} ===", busy(view.list_state()))];
    if let Some(placeholder) = view.placeholder() {
        lines.push(placeholder.to_string());
        return block(lines);
    }
    for row in view.rows() {
        let report = &row.report;
        lines.push(format!(
            "{:<18} {:<12} {:<24} {}",
            report.ref_id,
            badge(&report.status),
            report.street,
            row_actions(view, row)
        ));
        let created = report
            .created_at
            .as_deref()
            .map(crate::clock::display_or_raw)
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "    {}, {} | {} | {}",
            report.city, report.area, report.issue_type, created
        ));
        if !report.description.is_empty() {
            lines.push(format!("    {}", report.description));
        }
    }
    lines.push(format!("Total: {} reports", view.rows().len()));
    block(lines)
}

pub fn render_solution(view: &ReportListView) -> String {
    let mut lines = Vec::new();
    match view.solution() {
        None => {}
        Some(SolutionPanel::Accepted { ref_id, suggested_actions }) => {
            lines.push(format!("=== Issue accepted: {} ===", ref_id));
            if suggested_actions.is_empty() {
                lines.push("No suggested actions".to_string());
            }
            lines.extend(suggested_actions.iter().map(|a| format!("  - {}", a)));
        }
        Some(SolutionPanel::Details { ref_id, street, status, reported, checklist }) => {
            lines.push(format!("=== Report {} ===", ref_id));
            lines.push(format!("Street:   {}", street));
            lines.push(format!("Status:   {}", status));
            lines.push(format!("Reported: {}", reported));
            if let Some(checklist) = checklist {
                lines.push("Standard solution:".to_string());
                lines.extend(checklist.iter().map(|step| format!("  [ ] {}", step)));
            }
        }
    }
    block(lines)
}

pub fn render_submission(console: &Console) -> String {
    let submission = &console.submission;
    let form = &submission.form;
    let mut lines = vec![format!("=== New report{} ===", busy(submission.state()))];
    for (label, value) in [
        ("city*", &form.city),
        ("area*", &form.area),
        ("street*", &form.street),
        ("issue_type", &form.issue_type),
        ("description", &form.description),
        ("email*", &form.email),
    ] {
        lines.push(format!("  {:<12} {}", label, value));
    }
    match submission.panel() {
        None => {}
        Some(SubmissionPanel::Submitted { ref_id, response, email }) => {
            lines.push(format!("Submitted: {}", ref_id));
            lines.push(response.clone());
            lines.push(format!("A confirmation email was attempted to {}", email));
        }
        Some(SubmissionPanel::Failed { message, body }) => {
            lines.push(format!("Submission failed: {}", message));
            lines.push(body.clone());
        }
        Some(SubmissionPanel::Unreachable { error }) => {
            lines.push(format!("Backend unreachable: {}", error));
            lines.push("Start it with:".to_string());
            lines.extend(BACKEND_RUNBOOK.iter().map(|step| format!("  $ {}", step)));
        }
    }
    block(lines)
}

pub fn render_sensor(console: &Console) -> String {
    let sensor = &console.sensor;
    let mut lines = vec![
        format!("=== Sensor simulator{} ===", busy(sensor.state())),
        format!(
            "  ref: {}  lux: {}  timestamp: {}",
            sensor.fields.ref_id, sensor.fields.lux, sensor.fields.timestamp
        ),
    ];
    match sensor.panel() {
        None => {}
        Some(SensorPanel::Result { message, lux, sent_at, server_time, verified, suggested_actions }) => {
            lines.push(format!("Sensor Result: {}", message));
            let lux = lux.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string());
            lines.push(format!("  Reading sent: {} lux at {}", lux, sent_at));
            if let Some(server_time) = server_time {
                lines.push(format!("  Server processed: {}", server_time));
            }
            if let Some(verified) = verified {
                lines.push(format!("  Verified by sensor: {}", verified));
            }
            lines.extend(suggested_actions.iter().map(|a| format!("  - {}", a)));
        }
        Some(SensorPanel::Unreachable { error }) => {
            lines.push(format!("Backend unreachable: {}", error));
        }
    }
    block(lines)
}

pub fn render_controls(controls: Controls) -> String {
    format!(
        "Submit: {}  Sensor send: {}  Download JSON: {}\n",
        switch(controls.submit),
        switch(controls.sensor_send),
        switch(controls.download)
    )
}

pub fn render_export(console: &Console) -> String {
    match (console.export_state(), console.last_export()) {
        (ControlState::InFlight, _) => "Downloading issues JSON...\n".to_string(),
        (ControlState::SuccessShown, Some(path)) => format!("Saved {}\n", path.display()),
        _ => String::new(),
    }
}

/// Render a single panel
pub fn render_panel(console: &Console, panel: Panel) -> String {
    match panel {
        Panel::Status => {
            let mut out = render_status(&console.health);
            out.push_str(&render_controls(console.controls()));
            out
        }
        Panel::Reports => render_reports(&console.reports),
        Panel::Solution => render_solution(&console.reports),
        Panel::Submission => render_submission(console),
        Panel::Sensor => render_sensor(console),
        Panel::Export => render_export(console),
    }
}

/// The whole page, top to bottom
pub fn render_page(console: &Console) -> String {
    [
        Panel::Status,
        Panel::Reports,
        Panel::Solution,
        Panel::Submission,
        Panel::Sensor,
        Panel::Export,
    ]
    .into_iter()
    .map(|panel| render_panel(console, panel))
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::types::{AcceptResponse, Report};

    fn report(ref_id: &str, status: &str) -> Report {
        serde_json::from_value(serde_json::json!({
            "ref_id": ref_id,
            "city": "Metroville",
            "area": "Downtown",
            "street": "Elm Street",
            "status": status
        }))
        .unwrap()
    }

    #[test]
    fn test_badges_are_distinct() {
        let open = badge(&ReportStatus::Open);
        let verified = badge(&ReportStatus::Verified);
        let other = badge(&ReportStatus::from("escalated"));
        assert_ne!(open, verified);
        assert_eq!(other, "[escalated]");
    }

    #[test]
    fn test_row_actions() {
        let mut view = ReportListView::new();
        view.apply_reports(vec![
            report("SC-1", "open"),
            report("SC-2", "verified"),
            report("SC-3", "escalated"),
        ]);
        let actions = |view: &ReportListView, id: &str| row_actions(view, view.row(id).unwrap());

        assert_eq!(actions(&view, "SC-1"), "Accept | View");
        assert_eq!(actions(&view, "SC-2"), "View");
        assert_eq!(actions(&view, "SC-3"), "View");

        view.set_accept_gate(false);
        assert_eq!(actions(&view, "SC-1"), "Accept (disabled) | View");

        view.set_accept_gate(true);
        view.apply_accept("SC-1", Ok(AcceptResponse::default()));
        assert_eq!(actions(&view, "SC-1"), "Accepted | View");
    }

    #[test]
    fn test_statusless_row_has_no_accept() {
        let mut view = ReportListView::new();
        let statusless: Report =
            serde_json::from_value(serde_json::json!({"ref_id": "SC-9", "street": "Oak"})).unwrap();
        view.apply_reports(vec![statusless]);

        let text = render_reports(&view);
        assert!(text.contains("[unknown]"));
        assert_eq!(row_actions(&view, view.row("SC-9").unwrap()), "View");
    }

    #[test]
    fn test_panels_end_with_newline() {
        let view = ReportListView::new();
        assert!(render_reports(&view).ends_with("No reports yet\n"));
        assert_eq!(render_solution(&view), "");
    }

    #[test]
    fn test_placeholder_replaces_rows() {
        let view = ReportListView::new();
        let text = render_reports(&view);
        assert!(text.contains("No reports yet"));
        assert!(!text.contains("Total"));
    }

    #[tokio::test]
    async fn test_page_sections() {
        let mut console = Console::new(ConsoleConfig::new("http://backend.test/api"));
        console.apply(crate::console::Outcome::Reports(Ok(vec![report("SC-1", "open")])));

        let page = render_page(&console);
        assert!(page.starts_with("Server: online"));
        assert!(page.contains("SC-1"));
        assert!(page.contains("=== New report ==="));
        assert!(page.contains("=== Sensor simulator ==="));
        assert!(page.contains("Submit: enabled"));

        console.toggle_simulate_offline();
        let status = render_panel(&console, Panel::Status);
        assert!(status.contains("Server: offline (simulated)"));
        assert!(status.contains("Submit: disabled"));
        assert!(status.contains("Simulated: offline (click to resume)"));
    }

    #[test]
    fn test_unreachable_submission_shows_runbook() {
        let mut console = Console::new(ConsoleConfig::new("http://backend.test/api"));
        let payload = crate::types::NewReport {
            ref_id: "SC-20240305-1234".into(),
            city: "c".into(),
            area: "a".into(),
            street: "s".into(),
            issue_type: String::new(),
            description: String::new(),
            email: "e@example.com".into(),
            timestamp: "t".into(),
        };
        console.apply(crate::console::Outcome::Submitted {
            payload,
            result: Err(crate::types::ConsoleError::Transport("connection refused".into())),
        });
        let text = render_submission(&console);
        assert!(text.contains("connection refused"));
        assert!(text.contains("$ python app.py"));
    }
}
