// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! threatscan - threat-indicator/event correlation scanner

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use threatscan_backend::HttpSearchBackend;
use threatscan_core::SystemClock;
use threatscan_engine::{ScanConfig, ScanOrchestrator, TracingScanLog};

#[derive(Parser)]
#[command(name = "threatscan", version, about = "Threat-indicator/event correlation scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan pass over the configured threat/event indices
    Scan(ScanArgs),
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Indicator index to scan (repeatable)
    #[arg(long = "threat-index", required = true)]
    threat_index: Vec<String>,

    /// Event index to correlate against (repeatable)
    #[arg(long = "events-index", required = true)]
    events_index: Vec<String>,

    /// Maximum number of in-flight event-count calls per page
    #[arg(long, env = "THREATSCAN_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Scheduling interval, e.g. "10s", "5m", "1h"
    #[arg(long, env = "THREATSCAN_INTERVAL")]
    interval: Option<String>,

    /// Enable verbose structured logging
    #[arg(long)]
    verbose: bool,

    /// Base URL of the search backend
    #[arg(long = "backend-url", env = "THREATSCAN_BACKEND_URL")]
    backend_url: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        let msg = format_error(&err);
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let Commands::Scan(args) = cli.command;

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    let interval = args.interval.unwrap_or_else(|| "5m".to_string());

    let backend = HttpSearchBackend::new(args.backend_url)?;
    let orchestrator = ScanOrchestrator::new(backend, SystemClock, Arc::new(TracingScanLog));

    let config = ScanConfig {
        threat_index: args.threat_index,
        events_index: args.events_index,
        concurrency,
        verbose: args.verbose,
        interval,
    };

    let report = orchestrator.run(&config).await?;
    if report.paused {
        tracing::info!("scan paused at its deadline; remaining indicators stay eligible");
    }
    Ok(())
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, skip the
/// "Caused by" chain to avoid noisy duplicate output (common with thiserror
/// variants using `#[error("... {0}")]` plus `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}
