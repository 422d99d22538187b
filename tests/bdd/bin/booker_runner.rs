//! Booking API scenario runner
//!
//! Usage:
//!   cargo run --bin booker-runner -- [--suite SUITE] [--keep-reports]
//!
//! Examples:
//!   cargo run --bin booker-runner -- --suite smoke
//!   cargo run --bin booker-runner -- --suite security --reports-dir /tmp/reports
//!   API_BASE_URL=http://localhost:3001 cargo run --bin booker-runner -- --suite all

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use booker_bdd::{run_suite, Suite};
use booker_client::HarnessConfig;
use booker_monitoring::logging::LogExt;
use booker_monitoring::MonitoringConfig;
use booker_test_utils::report::{render_text, report_paths, save_json, save_text};
use booker_test_utils::{HarnessSession, RunPaths};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Run booking API scenarios and write reports", long_about = None)]
struct Cli {
    /// Scenarios to run, selected by tag
    #[arg(long, value_enum, default_value_t = Suite::All)]
    suite: Suite,

    /// Base URL of the API under test, overrides API_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Directory holding the JSON fixtures
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding the feature files
    #[arg(long)]
    features_dir: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// Keep reports from earlier runs
    #[arg(long)]
    keep_reports: bool,
}

impl Cli {
    fn paths(&self) -> RunPaths {
        let mut paths = RunPaths::load();
        if let Some(dir) = &self.data_dir {
            paths.data_dir = dir.clone();
        }
        if let Some(dir) = &self.features_dir {
            paths.features_dir = dir.clone();
        }
        if let Some(dir) = &self.reports_dir {
            paths.reports_dir = dir.clone();
        }
        paths
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    booker_monitoring::init(&MonitoringConfig::from_env())?;

    let paths = cli.paths();
    paths
        .prepare_reports_dir(cli.keep_reports)
        .with_context(|| format!("preparing {}", paths.reports_dir.display()))?;

    let mut config = HarnessConfig::load();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }

    let session = Arc::new(HarnessSession::new(config, paths.clone())?);
    if !session.check_api_health().await {
        warn!("API at {} failed its health check", session.config().base_url);
    }

    let suite = cli.suite.name();
    info!("Running {} suite against {}", suite, session.config().base_url);
    let summary = run_suite(Arc::clone(&session), cli.suite, &paths.features_dir).await;

    let report = render_text(suite, &summary, &session.results().records());
    let (text_path, json_path) = report_paths(&paths.reports_dir, suite, Local::now());
    save_text(&report, &text_path).log_err("Failed to write text report")?;
    save_json(&summary, &json_path).log_err("Failed to write JSON report")?;

    println!("{report}");
    println!("Reports:");
    for path in [&text_path, &json_path] {
        let size = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        println!("  {} ({} bytes)", path.display(), size);
    }

    booker_monitoring::shutdown();

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
