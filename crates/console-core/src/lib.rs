//! ============================================================================
//! CONSOLE-CORE: Street Light Report Console
//! ============================================================================
//! Client-side logic for the street light report console:
//! - Health monitor with a manual "simulate offline" override
//! - Report list with Accept / View actions
//! - Submission form with local validation and reference ids
//! - Sensor simulator posting synthetic light readings
//! All backend calls go through the `ReportApi` trait.
//! ============================================================================

pub mod api;
pub mod clock;
pub mod config;
pub mod console;
pub mod health;
pub mod reports;
pub mod sensor;
pub mod submission;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use types::*;
pub use api::{HttpReportApi, ReportApi};
pub use config::ConsoleConfig;
pub use console::{perform, Console, Controls, Effect, Outcome, Panel};
pub use health::HealthMonitor;
pub use reports::ReportListView;
pub use sensor::{SensorField, SensorSimulator};
pub use submission::{FormField, SubmissionForm};
