use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

mod args;
mod exit_codes;

use args::Cli;
use xraylink_core::{Reconciler, TestRunReport};
use xraylink_remote::{JiraClient, RemoteConfig, XrayClient};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let config = match RemoteConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return e.exit_code();
        }
    };

    let report = match TestRunReport::from_path(&cli.results) {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return exit_codes::REPORT_ERROR;
        }
    };
    info!(
        path = %cli.results.display(),
        executions = report.executions.len(),
        "loaded run report"
    );

    let jira = match JiraClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{e}");
            return e.exit_code();
        }
    };

    // Token exchange happens once, up front. Without a session no
    // later call can succeed, so a failure here aborts the run.
    let session = match XrayClient::new(&config) {
        Ok(client) => match client.authenticate().await {
            Ok(session) => session,
            Err(e) => {
                error!("authentication failed: {e}");
                return exit_codes::AUTH_ERROR;
            }
        },
        Err(e) => {
            error!("{e}");
            return e.exit_code();
        }
    };

    let reconciler = Reconciler::new(Arc::new(jira), Arc::new(session));
    match reconciler.reconcile(&report).await {
        Ok(summary) => {
            println!("xraylink: {summary}");
            if summary.is_clean() {
                exit_codes::SUCCESS
            } else {
                exit_codes::PARTIAL
            }
        }
        Err(e) => {
            error!("{e}");
            exit_codes::REPORT_ERROR
        }
    }
}
