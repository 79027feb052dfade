//! ============================================================================
//! Report Console - the session object tying the panels together
//! ============================================================================
//! User actions return `Effect`s (backend work). Whoever owns the event loop
//! runs them with `perform` (the CLI spawns one task per effect) and feeds the
//! resulting `Outcome` back through `Console::apply`, which may ask for more
//! effects (a list refresh after a successful write).
//!
//! Pattern: action -> Vec<Effect> -> perform -> Outcome -> apply -> Vec<Effect>
//!
//! Results are applied in arrival order; nothing de-duplicates overlapping
//! requests, so the last result applied wins for a shared panel.
//! ============================================================================

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::ReportApi;
use crate::config::ConsoleConfig;
use crate::health::{evaluate_probe, HealthMonitor, SIMULATED_OFFLINE_REASON};
use crate::reports::ReportListView;
use crate::sensor::SensorSimulator;
use crate::submission::SubmissionForm;
use crate::types::{
    AcceptResponse, ConsoleResult, ControlState, HealthResponse, NewReport, Reaction,
    Report, SensorReading, SensorResponse,
};

/// Alert when the export cannot be fetched or saved
pub const EXPORT_FAILED_ALERT: &str = "Could not download issues JSON. Is the backend running?";

/// Backend work requested by the console
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CheckHealth,
    FetchReports,
    FetchReport(String),
    Accept { ref_id: String, notes: String },
    Submit(NewReport),
    SendReading(SensorReading),
    Export(PathBuf),
}

/// Result of running an `Effect`
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Health(ConsoleResult<HealthResponse>),
    Reports(ConsoleResult<Vec<Report>>),
    Report(ConsoleResult<Report>),
    Accepted {
        ref_id: String,
        result: ConsoleResult<AcceptResponse>,
    },
    Submitted {
        payload: NewReport,
        result: ConsoleResult<Value>,
    },
    ReadingSent {
        reading: SensorReading,
        result: ConsoleResult<SensorResponse>,
    },
    Exported(ConsoleResult<PathBuf>),
}

/// Run one effect against the backend. Never panics on backend failure.
pub async fn perform(api: &dyn ReportApi, effect: Effect) -> Outcome {
    debug!("Performing {:?}", effect);
    match effect {
        Effect::CheckHealth => Outcome::Health(api.health().await),
        Effect::FetchReports => Outcome::Reports(api.list_reports().await),
        Effect::FetchReport(ref_id) => Outcome::Report(api.get_report(&ref_id).await),
        Effect::Accept { ref_id, notes } => {
            let result = api.accept_report(&ref_id, &notes).await;
            Outcome::Accepted { ref_id, result }
        }
        Effect::Submit(payload) => {
            let result = api.create_report(&payload).await;
            Outcome::Submitted { payload, result }
        }
        Effect::SendReading(reading) => {
            let result = api.send_reading(&reading).await;
            Outcome::ReadingSent { reading, result }
        }
        Effect::Export(path) => Outcome::Exported(export_to(api, path).await),
    }
}

async fn export_to(api: &dyn ReportApi, path: PathBuf) -> ConsoleResult<PathBuf> {
    let data = api.export_reports().await?;
    let pretty = serde_json::to_string_pretty(&data)?;
    tokio::fs::write(&path, pretty).await?;
    info!("Saved issues export to {}", path.display());
    Ok(path)
}

/// Screen regions, used to tell the renderer what changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Panel {
    Status,
    Reports,
    Solution,
    Submission,
    Sensor,
    Export,
}

/// Health-gated controls outside the report rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub submit: bool,
    pub sensor_send: bool,
    pub download: bool,
}

impl Controls {
    fn all(enabled: bool) -> Self {
        Self {
            submit: enabled,
            sensor_send: enabled,
            download: enabled,
        }
    }
}

/// The console session
pub struct Console {
    config: ConsoleConfig,
    pub health: HealthMonitor,
    pub reports: ReportListView,
    pub submission: SubmissionForm,
    pub sensor: SensorSimulator,
    controls: Controls,
    export_state: ControlState,
    last_export: Option<PathBuf>,
    alerts: Vec<String>,
    changed: BTreeSet<Panel>,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Self {
        let health = HealthMonitor::new(config.online_banner_ttl);
        Self {
            config,
            health,
            reports: ReportListView::new(),
            submission: SubmissionForm::new(),
            sensor: SensorSimulator::new(),
            controls: Controls::all(true),
            export_state: ControlState::Idle,
            last_export: None,
            alerts: Vec::new(),
            changed: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn export_state(&self) -> ControlState {
        self.export_state
    }

    pub fn last_export(&self) -> Option<&PathBuf> {
        self.last_export.as_ref()
    }

    /// Initial load: list and health
    pub fn startup(&mut self) -> Vec<Effect> {
        info!("Report console starting against {}", self.config.api_base);
        let mut effects = self.refresh_reports();
        effects.extend(self.check_health());
        effects
    }

    pub fn check_health(&mut self) -> Vec<Effect> {
        vec![Effect::CheckHealth]
    }

    pub fn refresh_reports(&mut self) -> Vec<Effect> {
        self.reports.begin_fetch();
        vec![Effect::FetchReports]
    }

    /// Single point that renders status and gates every control
    pub fn set_server_status(&mut self, ok: bool, reason: Option<String>) {
        let online = self.health.set_server_status(ok, reason);
        self.controls = Controls::all(online);
        self.reports.set_accept_gate(online);
        self.changed.insert(Panel::Status);
        self.changed.insert(Panel::Reports);
    }

    /// Flip the offline override. Turning it off re-checks health right away.
    pub fn toggle_simulate_offline(&mut self) -> Vec<Effect> {
        if self.health.toggle_simulate_offline() {
            self.set_server_status(false, Some(SIMULATED_OFFLINE_REASON.to_string()));
            Vec::new()
        } else {
            self.changed.insert(Panel::Status);
            self.check_health()
        }
    }

    pub fn view_report(&mut self, ref_id: &str) -> Vec<Effect> {
        self.reports.begin_view();
        vec![Effect::FetchReport(ref_id.to_string())]
    }

    /// Accept a row. `notes` is `None` when the prompt was cancelled.
    pub fn accept_report(&mut self, ref_id: &str, notes: Option<String>) -> Vec<Effect> {
        if let Err(reason) = self.reports.check_accept(ref_id) {
            self.alert(reason);
            return Vec::new();
        }
        let Some(notes) = notes else {
            debug!("Accept of {} cancelled", ref_id);
            return Vec::new();
        };
        self.reports.begin_accept(ref_id);
        self.changed.insert(Panel::Reports);
        vec![Effect::Accept {
            ref_id: ref_id.to_string(),
            notes,
        }]
    }

    pub fn submit(&mut self) -> Vec<Effect> {
        if !self.controls.submit {
            self.alert("Submit is disabled while the backend is offline");
            return Vec::new();
        }
        match self.submission.begin_submit() {
            Ok(payload) => {
                self.changed.insert(Panel::Submission);
                vec![Effect::Submit(payload)]
            }
            Err(alert) => {
                self.alert(alert);
                Vec::new()
            }
        }
    }

    pub fn clear_form(&mut self) {
        self.submission.clear();
        self.changed.insert(Panel::Submission);
    }

    pub fn send_reading(&mut self) -> Vec<Effect> {
        if !self.controls.sensor_send {
            self.alert("Sensor send is disabled while the backend is offline");
            return Vec::new();
        }
        match self.sensor.begin_send() {
            Ok(reading) => {
                self.changed.insert(Panel::Sensor);
                vec![Effect::SendReading(reading)]
            }
            Err(alert) => {
                self.alert(alert);
                Vec::new()
            }
        }
    }

    pub fn export(&mut self) -> Vec<Effect> {
        self.export_to(self.config.export_path.clone())
    }

    pub fn export_to(&mut self, path: PathBuf) -> Vec<Effect> {
        if !self.controls.download {
            self.alert("Download is disabled while the backend is offline");
            return Vec::new();
        }
        self.export_state = ControlState::InFlight;
        vec![Effect::Export(path)]
    }

    /// Apply a finished request; returns follow-up effects
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Health(result) => {
                let (ok, reason) = evaluate_probe(&result);
                self.set_server_status(ok, reason);
                Vec::new()
            }
            Outcome::Reports(Ok(reports)) => {
                self.reports.apply_reports(reports);
                self.set_server_status(true, None);
                Vec::new()
            }
            Outcome::Reports(Err(e)) => {
                self.reports.apply_fetch_error(&e);
                self.set_server_status(false, Some(e.to_string()));
                Vec::new()
            }
            Outcome::Report(result) => {
                let reaction = self.reports.apply_detail(result);
                self.changed.insert(Panel::Solution);
                self.react(reaction)
            }
            Outcome::Accepted { ref_id, result } => {
                let reaction = self.reports.apply_accept(&ref_id, result);
                self.changed.insert(Panel::Solution);
                self.changed.insert(Panel::Reports);
                self.react(reaction)
            }
            Outcome::Submitted { payload, result } => {
                let reaction = self.submission.apply_submit(&payload, result);
                self.changed.insert(Panel::Submission);
                self.react(reaction)
            }
            Outcome::ReadingSent { reading, result } => {
                let reaction = self.sensor.apply_send(&reading, result);
                self.changed.insert(Panel::Sensor);
                self.react(reaction)
            }
            Outcome::Exported(Ok(path)) => {
                self.export_state = ControlState::SuccessShown;
                self.last_export = Some(path);
                self.changed.insert(Panel::Export);
                Vec::new()
            }
            Outcome::Exported(Err(e)) => {
                warn!("Export failed: {}", e);
                self.export_state = ControlState::ErrorShown;
                self.alert(EXPORT_FAILED_ALERT);
                Vec::new()
            }
        }
    }

    fn react(&mut self, reaction: Reaction) -> Vec<Effect> {
        if let Some(alert) = reaction.alert {
            self.alert(alert);
        }
        if reaction.refresh_reports {
            self.refresh_reports()
        } else {
            Vec::new()
        }
    }

    fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("Alert: {}", message);
        self.alerts.push(message);
    }

    /// Alerts raised since the last call
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Panels changed since the last call, in screen order
    pub fn take_changed(&mut self) -> Vec<Panel> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }

    /// Run effects and all their follow-ups to completion, one at a time
    pub async fn run(&mut self, api: &dyn ReportApi, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let outcome = perform(api, effect).await;
            queue.extend(self.apply(outcome));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{ACTION_UNREACHABLE, DETAIL_UNREACHABLE, REPORTS_UNAVAILABLE};
    use crate::sensor::{SensorField, SensorPanel, MISSING_REF_ALERT};
    use crate::submission::{FormField, SubmissionPanel, REQUIRED_FIELDS_ALERT};
    use crate::types::ConsoleError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory backend recording every call
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        reports: Mutex<Vec<Report>>,
        unreachable: bool,
        healthy: bool,
    }

    impl RecordingApi {
        fn online(reports: Vec<Report>) -> Self {
            Self {
                reports: Mutex::new(reports),
                healthy: true,
                ..Default::default()
            }
        }

        fn unreachable() -> Self {
            Self {
                unreachable: true,
                ..Default::default()
            }
        }

        fn record(&self, call: String) -> ConsoleResult<()> {
            self.calls.lock().unwrap().push(call);
            if self.unreachable {
                return Err(ConsoleError::Transport("error sending request: connection refused".into()));
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportApi for RecordingApi {
        async fn health(&self) -> ConsoleResult<HealthResponse> {
            self.record("GET /health".into())?;
            Ok(HealthResponse {
                status: Some("ok".into()),
                db: Some(self.healthy),
            })
        }

        async fn list_reports(&self) -> ConsoleResult<Vec<Report>> {
            self.record("GET /issues".into())?;
            Ok(self.reports.lock().unwrap().clone())
        }

        async fn get_report(&self, ref_id: &str) -> ConsoleResult<Report> {
            self.record(format!("GET /issues/{}", ref_id))?;
            self.reports
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.ref_id == ref_id)
                .cloned()
                .ok_or_else(|| ConsoleError::Application {
                    status: 404,
                    message: "Not found".into(),
                    body: json!({"error": "Not found"}),
                })
        }

        async fn create_report(&self, report: &NewReport) -> ConsoleResult<Value> {
            self.record(format!("POST /issues {}", report.ref_id))?;
            Ok(json!({"ref_id": report.ref_id}))
        }

        async fn accept_report(&self, ref_id: &str, notes: &str) -> ConsoleResult<AcceptResponse> {
            self.record(format!("POST /issues/{}/accept {}", ref_id, notes))?;
            let mut reports = self.reports.lock().unwrap();
            if let Some(r) = reports.iter_mut().find(|r| r.ref_id == ref_id) {
                r.status = crate::types::ReportStatus::Verified;
            }
            Ok(AcceptResponse {
                suggested_actions: Some(vec!["Dispatch crew".into()]),
            })
        }

        async fn send_reading(&self, reading: &SensorReading) -> ConsoleResult<SensorResponse> {
            self.record(format!(
                "POST /sensor {}",
                serde_json::to_string(reading).unwrap()
            ))?;
            Ok(SensorResponse {
                message: Some("Reading stored".into()),
                ..Default::default()
            })
        }

        async fn export_reports(&self) -> ConsoleResult<Value> {
            self.record("GET /data/issues".into())?;
            Ok(json!({"issues": []}))
        }
    }

    fn report(ref_id: &str, status: &str) -> Report {
        serde_json::from_value(json!({"ref_id": ref_id, "street": "Elm", "status": status})).unwrap()
    }

    fn console() -> Console {
        Console::new(ConsoleConfig::new("http://backend.test/api"))
    }

    fn fill_form(console: &mut Console) {
        let form = &mut console.submission.form;
        form.set(FormField::City, "Metroville");
        form.set(FormField::Area, "Downtown");
        form.set(FormField::Street, "Elm Street");
        form.set(FormField::Email, "citizen@example.com");
    }

    #[tokio::test]
    async fn test_startup_fetches_list_and_health() {
        let api = RecordingApi::online(vec![report("SC-1", "open"), report("SC-2", "open")]);
        let mut console = console();
        let effects = console.startup();
        assert_eq!(effects, vec![Effect::FetchReports, Effect::CheckHealth]);

        console.run(&api, effects).await;

        assert_eq!(api.calls(), vec!["GET /issues", "GET /health"]);
        assert_eq!(console.health.indicator(), "Server: online");
        let ids: Vec<_> = console.reports.rows().iter().map(|r| r.report.ref_id.clone()).collect();
        assert_eq!(ids, vec!["SC-2", "SC-1"]);
        assert_eq!(console.take_changed(), vec![Panel::Status, Panel::Reports]);
    }

    #[tokio::test]
    async fn test_override_disables_every_control() {
        let api = RecordingApi::online(vec![report("SC-1", "open"), report("SC-2", "open")]);
        let mut console = console();
        let effects = console.startup();
        console.run(&api, effects).await;

        assert!(console.toggle_simulate_offline().is_empty());
        console.set_server_status(true, None);

        assert_eq!(console.health.indicator(), "Server: offline (simulated)");
        assert_eq!(console.controls(), Controls::all(false));
        for row in console.reports.rows() {
            assert!(!console.reports.accept_enabled(row));
        }

        // A healthy poll cannot lift it either
        console.run(&api, vec![Effect::CheckHealth]).await;
        assert_eq!(console.controls(), Controls::all(false));
    }

    #[tokio::test]
    async fn test_resume_rechecks_and_reenables() {
        let api = RecordingApi::online(vec![report("SC-1", "open")]);
        let mut console = console();
        console.toggle_simulate_offline();
        assert_eq!(console.controls(), Controls::all(false));

        let effects = console.toggle_simulate_offline();
        assert_eq!(effects, vec![Effect::CheckHealth]);
        console.run(&api, effects).await;

        assert_eq!(console.health.indicator(), "Server: online");
        assert_eq!(console.controls(), Controls::all(true));
    }

    #[tokio::test]
    async fn test_healthy_response_reenables_controls() {
        let mut console = console();
        console.set_server_status(false, Some("timeout".into()));
        console.reports.apply_reports(vec![report("SC-1", "open")]);
        assert!(!console.reports.accept_enabled(&console.reports.rows()[0]));

        console.apply(Outcome::Health(Ok(HealthResponse {
            status: Some("ok".into()),
            db: Some(true),
        })));

        assert_eq!(console.health.indicator(), "Server: online");
        assert_eq!(console.controls(), Controls::all(true));
        assert!(console.reports.accept_enabled(&console.reports.rows()[0]));
    }

    #[tokio::test]
    async fn test_db_down_is_offline() {
        let api = RecordingApi::default();
        let mut console = console();
        console.run(&api, vec![Effect::CheckHealth]).await;
        assert_eq!(console.health.indicator(), "Server: offline");
        assert_eq!(console.controls(), Controls::all(false));
    }

    #[tokio::test]
    async fn test_blank_required_field_sends_nothing() {
        let api = RecordingApi::online(vec![]);
        let mut console = console();
        fill_form(&mut console);
        console.submission.form.set(FormField::Street, "  ");

        let effects = console.submit();

        assert!(effects.is_empty());
        assert_eq!(console.take_alerts(), vec![REQUIRED_FIELDS_ALERT.to_string()]);
        console.run(&api, effects).await;
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_success_resets_and_refreshes() {
        let api = RecordingApi::online(vec![]);
        let mut console = console();
        fill_form(&mut console);

        let effects = console.submit();
        console.run(&api, effects).await;

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("POST /issues SC-"));
        assert_eq!(calls[1], "GET /issues");
        assert!(console.submission.form.city.is_empty());
        assert!(matches!(
            console.submission.panel(),
            Some(SubmissionPanel::Submitted { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_accept_makes_no_calls() {
        let api = RecordingApi::online(vec![report("SC-1", "open")]);
        let mut console = console();
        console.run(&api, vec![Effect::FetchReports]).await;

        let effects = console.accept_report("SC-1", None);

        assert!(effects.is_empty());
        console.run(&api, effects).await;
        assert_eq!(api.calls(), vec!["GET /issues"]);
        assert!(console.take_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_accept_posts_once_and_refetches() {
        let api = RecordingApi::online(vec![report("SC-1", "open"), report("SC-2", "open")]);
        let mut console = console();
        console.run(&api, vec![Effect::FetchReports]).await;

        let effects = console.accept_report("SC-1", Some("Assigned to maintenance team".into()));
        assert_eq!(effects.len(), 1);

        // The row is disabled as soon as the accept result lands
        let outcome = perform(&api, effects[0].clone()).await;
        let follow_up = console.apply(outcome);
        assert!(!console.reports.accept_enabled(console.reports.row("SC-1").unwrap()));
        assert!(console.reports.accept_enabled(console.reports.row("SC-2").unwrap()));
        assert_eq!(follow_up, vec![Effect::FetchReports]);

        console.run(&api, follow_up).await;
        assert_eq!(
            api.calls(),
            vec![
                "GET /issues",
                "POST /issues/SC-1/accept Assigned to maintenance team",
                "GET /issues",
            ]
        );
        // After the refetch the backend reports it verified
        assert!(!console.reports.row("SC-1").unwrap().has_accept());
    }

    #[tokio::test]
    async fn test_sensor_blank_ref_and_coercion() {
        let api = RecordingApi::online(vec![]);
        let mut console = console();

        assert!(console.send_reading().is_empty());
        assert_eq!(console.take_alerts(), vec![MISSING_REF_ALERT.to_string()]);

        console.sensor.fields.set(SensorField::RefId, "SC-1");
        console.sensor.fields.set(SensorField::Lux, "12");
        console.sensor.fields.set(SensorField::Timestamp, "2024-03-05T21:15:00Z");
        let effects = console.send_reading();
        console.run(&api, effects).await;

        let calls = api.calls();
        assert_eq!(
            calls[0],
            r#"POST /sensor {"ref_id":"SC-1","lux":12.0,"timestamp":"2024-03-05T21:15:00Z"}"#
        );
        assert_eq!(calls[1], "GET /issues");
        assert!(matches!(console.sensor.panel(), Some(SensorPanel::Result { .. })));
    }

    #[tokio::test]
    async fn test_transport_failures_render_unreachable() {
        let api = RecordingApi::unreachable();
        let mut console = console();

        // List
        console.run(&api, vec![Effect::FetchReports]).await;
        assert_eq!(console.reports.placeholder(), Some(REPORTS_UNAVAILABLE));
        assert_eq!(console.health.indicator(), "Server: offline");
        assert!(console.health.message().text().starts_with("Backend unreachable"));

        // Detail
        console.run(&api, vec![Effect::FetchReport("SC-1".into())]).await;
        assert_eq!(console.take_alerts(), vec![DETAIL_UNREACHABLE.to_string()]);

        // Accept
        console.reports.apply_reports(vec![report("SC-1", "open")]);
        console
            .run(&api, vec![Effect::Accept { ref_id: "SC-1".into(), notes: "n".into() }])
            .await;
        assert_eq!(console.take_alerts(), vec![ACTION_UNREACHABLE.to_string()]);

        // Submit
        fill_form(&mut console);
        let payload = console.submission.begin_submit().unwrap();
        console.run(&api, vec![Effect::Submit(payload)]).await;
        assert!(matches!(
            console.submission.panel(),
            Some(SubmissionPanel::Unreachable { .. })
        ));

        // Sensor
        console.sensor.fields.set(SensorField::RefId, "SC-1");
        let reading = console.sensor.begin_send().unwrap();
        console.run(&api, vec![Effect::SendReading(reading)]).await;
        assert!(matches!(console.sensor.panel(), Some(SensorPanel::Unreachable { .. })));
    }

    #[tokio::test]
    async fn test_offline_blocks_gated_actions() {
        let api = RecordingApi::online(vec![]);
        let mut console = console();
        fill_form(&mut console);
        console.set_server_status(false, Some("down".into()));

        assert!(console.submit().is_empty());
        console.sensor.fields.set(SensorField::RefId, "SC-1");
        assert!(console.send_reading().is_empty());
        assert!(console.export().is_empty());
        assert_eq!(console.take_alerts().len(), 3);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_pretty_json() {
        let api = RecordingApi::online(vec![]);
        let dir = std::env::temp_dir().join(format!("report-console-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("issues.json");

        let mut console = console();
        let effects = console.export_to(path.clone());
        console.run(&api, effects).await;

        assert_eq!(console.export_state(), ControlState::SuccessShown);
        assert_eq!(console.last_export(), Some(&path));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"issues\": []\n}");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_export_failure_alerts() {
        let api = RecordingApi::unreachable();
        let mut console = console();
        let effects = console.export_to(PathBuf::from("unused.json"));
        console.run(&api, effects).await;
        assert_eq!(console.take_alerts(), vec![EXPORT_FAILED_ALERT.to_string()]);
        assert_eq!(console.export_state(), ControlState::ErrorShown);
    }

    #[tokio::test]
    async fn test_last_applied_result_wins() {
        let mut console = console();
        console.apply(Outcome::Reports(Ok(vec![report("SC-1", "open")])));
        console.apply(Outcome::Reports(Ok(vec![report("SC-1", "open"), report("SC-2", "open")])));
        assert_eq!(console.reports.rows().len(), 2);

        console.apply(Outcome::Health(Err(ConsoleError::Transport("late probe".into()))));
        assert_eq!(console.health.indicator(), "Server: offline");
        assert_eq!(console.health.reason(), Some("late probe"));
    }
}
