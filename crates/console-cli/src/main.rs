// ============================================================================
// report-console — terminal client for the street light reports backend
// ============================================================================
// Usage:
//   report-console                         Interactive console (default)
//   report-console health                  Probe backend health once
//   report-console list                    List reports, newest first
//   report-console show REF                Show one report's details
//   report-console submit --city .. ...    Submit a new report
//   report-console accept REF [--notes N]  Accept an open report
//   report-console sensor --ref REF ...    Send a simulated sensor reading
//   report-console export [--out PATH]     Save all reports as JSON
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use clap::{Parser, Subcommand};
use console_core::config::health_interval_from_ms;
use console_core::view::{render_page, render_panel, render_reports, render_solution};
use console_core::{
    perform, Console, ConsoleConfig, Effect, FormField, HttpReportApi, Outcome, Panel, ReportApi,
    SensorField,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

/// Street light report console
#[derive(Parser)]
#[command(name = "report-console", version, about = "Browse, submit and accept street light reports")]
struct Cli {
    /// Backend API base URL (default: http://127.0.0.1:5000/api)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Health poll interval in milliseconds
    #[arg(long, global = true)]
    health_interval_ms: Option<u64>,

    /// Where `export` saves the issues JSON
    #[arg(long, global = true)]
    export_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console with live health polling
    Interactive,

    /// Probe backend health once
    Health,

    /// List current reports
    List,

    /// Show details of one report
    Show {
        ref_id: String,
    },

    /// Submit a new report
    Submit {
        #[arg(long)]
        city: String,
        #[arg(long)]
        area: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        issue_type: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Accept an open report
    Accept {
        ref_id: String,
        /// Action notes sent with the acceptance
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Send a simulated light sensor reading
    Sensor {
        #[arg(long = "ref")]
        ref_id: String,
        /// Light level; blank is 0
        #[arg(long, default_value = "")]
        lux: String,
        /// Reading time; defaults to now
        #[arg(long, default_value = "")]
        timestamp: String,
    },

    /// Download every report as JSON
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

const HELP: &str = "\
Commands:
  help                      Show this help
  page                      Redraw every panel
  list                      Refresh the report list
  view REF                  Show details of a report
  accept REF                Accept a report (next line is the notes, :cancel cancels)
  set FIELD VALUE           Set a form field (city, area, street, issue_type,
                            description, email) or sensor field (ref, lux, timestamp)
  submit                    Submit the form
  clear                     Clear the form
  send                      Send the sensor reading
  offline                   Toggle simulated offline mode
  health                    Check backend health now
  export                    Download issues JSON
  quit                      Exit";

fn config_from(cli: &Cli) -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::default();
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(ms) = cli.health_interval_ms {
        let Some(interval) = health_interval_from_ms(ms) else {
            anyhow::bail!("--health-interval-ms must be greater than 0");
        };
        config = config.with_health_interval(interval);
    }
    if let Some(path) = &cli.export_path {
        config = config.with_export_path(path.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("console_core=info".parse()?)
                .add_directive("report_console=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = config_from(&cli)?;
    let api: Arc<dyn ReportApi> = Arc::new(HttpReportApi::from_config(&config));
    let mut console = Console::new(config);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => cmd_interactive(console, api).await,
        Commands::Health => cmd_health(&mut console, api.as_ref()).await,
        Commands::List => cmd_list(&mut console, api.as_ref()).await,
        Commands::Show { ref_id } => cmd_show(&mut console, api.as_ref(), &ref_id).await,
        Commands::Submit {
            city,
            area,
            street,
            email,
            issue_type,
            description,
        } => {
            let form = &mut console.submission.form;
            form.set(FormField::City, city);
            form.set(FormField::Area, area);
            form.set(FormField::Street, street);
            form.set(FormField::Email, email);
            form.set(FormField::IssueType, issue_type);
            form.set(FormField::Description, description);
            let effects = console.submit();
            finish(&mut console, api.as_ref(), effects, Panel::Submission).await
        }
        Commands::Accept { ref_id, notes } => {
            // Acceptance is checked against the current list
            let refresh = console.refresh_reports();
            console.run(api.as_ref(), refresh).await;
            let effects = console.accept_report(&ref_id, Some(notes));
            finish(&mut console, api.as_ref(), effects, Panel::Solution).await
        }
        Commands::Sensor { ref_id, lux, timestamp } => {
            let fields = &mut console.sensor.fields;
            fields.set(SensorField::RefId, ref_id);
            fields.set(SensorField::Lux, lux);
            fields.set(SensorField::Timestamp, timestamp);
            let effects = console.send_reading();
            finish(&mut console, api.as_ref(), effects, Panel::Sensor).await
        }
        Commands::Export { out } => {
            let effects = match out {
                Some(path) => console.export_to(path),
                None => console.export(),
            };
            finish(&mut console, api.as_ref(), effects, Panel::Export).await
        }
    }
}

/// Run a one-shot command's effects, print its panel, fail on any alert
async fn finish(console: &mut Console, api: &dyn ReportApi, effects: Vec<Effect>, panel: Panel) -> Result<()> {
    let attempted = !effects.is_empty();
    console.run(api, effects).await;
    let alerts = console.take_alerts();
    if attempted {
        print!("{}", render_panel(console, panel));
    }
    if let Some(first) = alerts.first() {
        anyhow::bail!("{}", first);
    }
    Ok(())
}

async fn cmd_health(console: &mut Console, api: &dyn ReportApi) -> Result<()> {
    let effects = console.check_health();
    console.run(api, effects).await;
    print!("{}", render_panel(console, Panel::Status));
    if !console.health.is_online() {
        anyhow::bail!("Backend is offline");
    }
    Ok(())
}

async fn cmd_list(console: &mut Console, api: &dyn ReportApi) -> Result<()> {
    let effects = console.refresh_reports();
    console.run(api, effects).await;
    print!("{}", render_reports(&console.reports));
    Ok(())
}

async fn cmd_show(console: &mut Console, api: &dyn ReportApi, ref_id: &str) -> Result<()> {
    let effects = console.view_report(ref_id);
    console.run(api, effects).await;
    if let Some(alert) = console.take_alerts().first() {
        anyhow::bail!("{}", alert);
    }
    print!("{}", render_solution(&console.reports));
    Ok(())
}

/// Spawn each effect as its own task; outcomes come back over the channel
fn dispatch(api: &Arc<dyn ReportApi>, tx: &mpsc::UnboundedSender<Outcome>, effects: Vec<Effect>) {
    for effect in effects {
        let api = Arc::clone(api);
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = perform(api.as_ref(), effect).await;
            // Receiver is gone only on shutdown
            let _ = tx.send(outcome);
        });
    }
}

/// Print alerts and any changed panels. The status panel is compared
/// against what was last printed, so routine health polls stay quiet and a
/// dismissed banner still gets redrawn.
fn flush(console: &mut Console, last_status: &mut String) {
    for alert in console.take_alerts() {
        println!("ALERT: {}", alert);
    }
    let status = render_panel(console, Panel::Status);
    if status != *last_status {
        println!("{}", status);
        *last_status = status;
    }
    for panel in console.take_changed() {
        if panel == Panel::Status {
            continue;
        }
        let text = render_panel(console, panel);
        if !text.is_empty() {
            println!("{}", text);
        }
    }
}

/// What a line of input means given the current prompt
enum Input {
    Effects(Vec<Effect>),
    Quit,
}

fn handle_line(console: &mut Console, pending_accept: &mut Option<String>, line: &str) -> Input {
    if let Some(ref_id) = pending_accept.take() {
        let notes = (line.trim() != ":cancel").then(|| line.to_string());
        return Input::Effects(console.accept_report(&ref_id, notes));
    }

    let line = line.trim();
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).unwrap_or("");
    let rest = parts.next().unwrap_or("");

    let effects = match command {
        "" => Vec::new(),
        "help" | "?" => {
            println!("{}", HELP);
            Vec::new()
        }
        "page" => {
            println!("{}", render_page(console));
            Vec::new()
        }
        "list" => console.refresh_reports(),
        "view" if !arg.is_empty() => console.view_report(arg),
        "accept" if !arg.is_empty() => match console.reports.check_accept(arg) {
            Ok(()) => {
                println!("Action notes for {} (:cancel to cancel):", arg);
                *pending_accept = Some(arg.to_string());
                Vec::new()
            }
            Err(reason) => {
                println!("ALERT: {}", reason);
                Vec::new()
            }
        },
        "set" if !arg.is_empty() => {
            if let Ok(field) = arg.parse::<FormField>() {
                console.submission.form.set(field, rest);
            } else if let Ok(field) = arg.parse::<SensorField>() {
                console.sensor.fields.set(field, rest);
            } else {
                println!("Unknown field '{}'. Type `help` for the list.", arg);
            }
            Vec::new()
        }
        "submit" => console.submit(),
        "clear" => {
            console.clear_form();
            Vec::new()
        }
        "send" => console.send_reading(),
        "offline" => console.toggle_simulate_offline(),
        "health" => console.check_health(),
        "export" => console.export(),
        "quit" | "exit" => return Input::Quit,
        _ => {
            println!("Unknown command '{}'. Type `help` for the list.", line);
            Vec::new()
        }
    };
    Input::Effects(effects)
}

async fn cmd_interactive(mut console: Console, api: Arc<dyn ReportApi>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(console.config().health_interval);
    // The first tick fires immediately; startup already probes health
    ticker.tick().await;

    println!("Street light report console. Type `help` for commands.");
    let mut last_status = String::new();
    let mut pending_accept: Option<String> = None;
    let mut banner = console.health.online_banner().subscribe();
    let startup = console.startup();
    dispatch(&api, &tx, startup);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_line(&mut console, &mut pending_accept, &line) {
                    Input::Effects(effects) => dispatch(&api, &tx, effects),
                    Input::Quit => break,
                }
            }
            Some(outcome) = rx.recv() => {
                let follow_up = console.apply(outcome);
                dispatch(&api, &tx, follow_up);
            }
            _ = ticker.tick() => {
                let effects = console.check_health();
                dispatch(&api, &tx, effects);
            }
            Ok(()) = banner.changed() => {}
        }
        flush(&mut console, &mut last_status);
    }

    info!("Report console exiting");
    Ok(())
}
