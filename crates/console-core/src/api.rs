//! ============================================================================
//! Reports Backend API - HTTP contract consumed by the console
//! ============================================================================
//! Every call makes a single attempt. Failures are split into the two classes
//! the console renders differently:
//! - Transport: no response, or a body that does not decode
//! - Application: a decoded response that reports failure
//! ============================================================================

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::types::{
    AcceptRequest, AcceptResponse, ConsoleError, ConsoleResult, HealthResponse, NewReport, Report,
    SensorReading, SensorResponse,
};

/// Operations the console needs from the backend
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// GET /health
    async fn health(&self) -> ConsoleResult<HealthResponse>;

    /// GET /issues
    async fn list_reports(&self) -> ConsoleResult<Vec<Report>>;

    /// GET /issues/{ref_id}
    async fn get_report(&self, ref_id: &str) -> ConsoleResult<Report>;

    /// POST /issues, returns the raw response body
    async fn create_report(&self, report: &NewReport) -> ConsoleResult<Value>;

    /// POST /issues/{ref_id}/accept
    async fn accept_report(&self, ref_id: &str, notes: &str) -> ConsoleResult<AcceptResponse>;

    /// POST /sensor
    async fn send_reading(&self, reading: &SensorReading) -> ConsoleResult<SensorResponse>;

    /// GET /data/issues
    async fn export_reports(&self) -> ConsoleResult<Value>;
}

/// reqwest-backed implementation
#[derive(Debug, Clone)]
pub struct HttpReportApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReportApi {
    /// No request timeout is configured beyond the transport's own
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(config.normalized_base())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn issue_url(&self, ref_id: &str, suffix: &str) -> String {
        format!(
            "{}/issues/{}{}",
            self.base_url,
            urlencoding::encode(ref_id),
            suffix
        )
    }

    /// Send a request and decode its body, keeping the status for the caller
    async fn send_json(&self, request: reqwest::RequestBuilder) -> ConsoleResult<(StatusCode, Value)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ConsoleError::Transport(format!("Failed to decode response: {}", e)))?;
        Ok((status, body))
    }
}

/// Pick the first string field among `keys`, or fall back
fn error_message(body: &Value, keys: &[&str], fallback: &str) -> String {
    keys.iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn application_error(status: StatusCode, body: Value, keys: &[&str], fallback: &str) -> ConsoleError {
    let message = error_message(&body, keys, fallback);
    warn!("Backend rejected request ({}): {}", status, message);
    ConsoleError::Application {
        status: status.as_u16(),
        message,
        body,
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> ConsoleResult<T> {
    serde_json::from_value(body)
        .map_err(|e| ConsoleError::Transport(format!("Unexpected response shape: {}", e)))
}

#[async_trait]
impl ReportApi for HttpReportApi {
    async fn health(&self) -> ConsoleResult<HealthResponse> {
        debug!("Probing backend health at {}", self.base_url);
        let (status, body) = self.send_json(self.client.get(self.url("/health"))).await?;
        if !status.is_success() {
            return Err(application_error(status, body, &["error", "message"], "Health check failed"));
        }
        decode(body)
    }

    async fn list_reports(&self) -> ConsoleResult<Vec<Report>> {
        debug!("Fetching reports");
        let response = self.client.get(self.url("/issues")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Application {
                status: status.as_u16(),
                message: "API not available".to_string(),
                body: Value::Null,
            });
        }
        let reports: Vec<Report> = response
            .json()
            .await
            .map_err(|e| ConsoleError::Transport(format!("Failed to decode reports: {}", e)))?;
        info!("Fetched {} reports", reports.len());
        Ok(reports)
    }

    async fn get_report(&self, ref_id: &str) -> ConsoleResult<Report> {
        debug!("Fetching report {}", ref_id);
        let (status, body) = self.send_json(self.client.get(self.issue_url(ref_id, ""))).await?;
        if !status.is_success() {
            return Err(application_error(
                status,
                body,
                &["error"],
                "Could not fetch report details",
            ));
        }
        decode(body)
    }

    async fn create_report(&self, report: &NewReport) -> ConsoleResult<Value> {
        info!("Submitting report {}", report.ref_id);
        let response = self
            .client
            .post(self.url("/issues"))
            .header("Content-Type", "application/json")
            .json(report)
            .send()
            .await?;
        let status = response.status();
        // A failure body that is not JSON is rendered as null
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(application_error(status, body, &["error", "message"], "Submission failed"));
        }
        info!("Report {} accepted by backend", report.ref_id);
        Ok(body)
    }

    async fn accept_report(&self, ref_id: &str, notes: &str) -> ConsoleResult<AcceptResponse> {
        info!("Accepting report {}", ref_id);
        let request = self
            .client
            .post(self.issue_url(ref_id, "/accept"))
            .header("Content-Type", "application/json")
            .json(&AcceptRequest {
                action_notes: notes.to_string(),
            });
        let (status, body) = self.send_json(request).await?;
        if !status.is_success() {
            return Err(application_error(status, body, &["error"], "Accept failed"));
        }
        decode(body)
    }

    async fn send_reading(&self, reading: &SensorReading) -> ConsoleResult<SensorResponse> {
        info!("Sending sensor reading for {} ({:?} lux)", reading.ref_id, reading.lux);
        let request = self
            .client
            .post(self.url("/sensor"))
            .header("Content-Type", "application/json")
            .json(reading);
        let (status, body) = self.send_json(request).await?;
        if !status.is_success() {
            return Err(application_error(status, body, &["error"], "Sensor processing failed"));
        }
        decode(body)
    }

    async fn export_reports(&self) -> ConsoleResult<Value> {
        debug!("Exporting reports");
        let response = self.client.get(self.url("/data/issues")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConsoleError::Application {
                status: status.as_u16(),
                message: "Failed".to_string(),
                body: Value::Null,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ConsoleError::Transport(format!("Failed to decode export: {}", e)))
    }
}
