//! # subsidy-node
//!
//! Runs one ledger instance and applies newline-delimited JSON commands
//! from stdin (or a file), writing one JSON response per line to stdout.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from env, then apply CLI overrides
//! 2. Validate that a super admin is configured
//! 3. Initialize telemetry
//! 4. Bootstrap the ledger and start the event logger
//! 5. Serve commands until EOF or Ctrl+C
//! 6. Flush the event log

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use subsidy_runtime::{config, serve, RuntimeConfig, SubsidyService, SystemTimeSource};
use subsidy_telemetry::{init_telemetry, TelemetryConfig};
use tokio::io::{self, AsyncBufRead, BufReader};
use tracing::{info, warn};
use ts_01_role_registry::LastAdminPolicy;

/// Permissioned subsidy workflow ledger
#[derive(Parser, Debug)]
#[command(name = "subsidy-node")]
#[command(about = "Track subsidy goods from creation to beneficiary claim")]
struct Args {
    /// Super admin address (overrides TS_SUPER_ADMIN)
    #[arg(short, long)]
    super_admin: Option<String>,

    /// Whether the last super admin may be removed: protect or allow
    #[arg(short, long)]
    last_admin_policy: Option<LastAdminPolicy>,

    /// Events buffered per subscriber
    #[arg(short, long)]
    bus_capacity: Option<usize>,

    /// Bootstrap grant as ROLE=ADDRESS; may be repeated
    #[arg(short, long = "grant")]
    grants: Vec<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Read commands from this file instead of stdin
    input: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_env().context("reading TS_* environment")?;

    if let Some(address) = &args.super_admin {
        config.super_admin = address
            .parse()
            .with_context(|| format!("parsing --super-admin {address}"))?;
    }
    if let Some(policy) = args.last_admin_policy {
        config.last_admin_policy = policy;
    }
    if let Some(capacity) = args.bus_capacity {
        config.bus_capacity = capacity;
    }
    for grant in &args.grants {
        config
            .bootstrap
            .extend(config::parse_grants(grant).context("parsing --grant")?);
    }

    config.validate().context("invalid runtime configuration")?;
    Ok(config)
}

async fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let mut telemetry = TelemetryConfig::for_component("node");
    telemetry.json_logs |= args.json_logs;
    let _telemetry = init_telemetry(telemetry).context("initializing telemetry")?;

    let service = SubsidyService::from_config(&config, Arc::new(SystemTimeSource))
        .context("bootstrapping ledger")?;
    info!(
        super_admin = %config.super_admin,
        policy = %config.last_admin_policy,
        bus_capacity = config.bus_capacity,
        "Subsidy node ready"
    );

    let event_logger = service.spawn_event_logger();

    let input = open_input(args.input.as_ref()).await?;
    tokio::select! {
        served = serve(&service, input, io::stdout()) => {
            let answered = served.context("serving commands")?;
            info!(answered, "Input exhausted");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
        }
    }

    let stats = service.stats().await;
    info!(
        committed = stats.operations_committed,
        rejected = stats.operations_rejected,
        unauthorized = stats.unauthorized_attempts,
        "Shutting down"
    );

    // Closing the bus lets the logger finish the events already published
    drop(service);
    let logged = event_logger.await.context("event logger task")?;
    info!(logged, "Event log flushed");
    Ok(())
}
