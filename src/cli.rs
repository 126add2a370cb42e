use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::client::JiraClient;
use crate::export::export;
use crate::load_config::load_config;

/// CLI for jira2pdf: export Jira issues into partitioned PDF reports.
#[derive(Parser)]
#[clap(
    name = "jira2pdf",
    version,
    about = "Export Jira issues into partitioned, formatted PDF reports"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(short = 'f', long = "file")]
    pub file: PathBuf,
}

/// Extracted async CLI logic entrypoint for integration tests and main().
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.file)?;
    config.trace_loaded();

    let client = JiraClient::new(&config.jira)?;

    println!("Export starting...");
    match export(&config, &client).await {
        Ok(report) => {
            println!("Export complete.\nReport:");
            println!("{report:#?}");
            if let Ok(json) = serde_json::to_string_pretty(&report) {
                debug!(json = %json, "Export report as JSON");
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
