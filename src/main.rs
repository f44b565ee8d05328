//! Worker host (v1)
//!
//! Runs the sample relay service on the in-process engine.
//!
//! # Architecture Overview
//!
//! ```text
//!   sentinel file ──▶ StartupLog ─────────────────────────────┐
//!                                                             ▼
//!   config.toml ──▶ MemoryConfigSource ──▶ ServiceHost::execute ──▶ Engine
//!   --set k=v   ──┘                          │    ▲                 │
//!                                            │    └─ MasterSwitch ◀─┘
//!   SIGINT/SIGTERM ──▶ HostLifetime ─────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use worker_host::config::loader::{load_config, parse_overrides};
use worker_host::config::{BaseSettings, MemoryConfigSource};
use worker_host::engine::{MasterSwitch, StandaloneEngine};
use worker_host::lifecycle::{signals, ConsoleProbe, DetachedConsole, HostLifetime, ServiceHost, StdinConsole};
use worker_host::observability::{logging, metrics, StartupLog};
use worker_host::service::{HostType, SampleRelay, ServiceDefinition};

#[derive(Parser)]
#[command(name = "worker-host")]
#[command(about = "Hosts a worker service and its engine", long_about = None)]
struct Cli {
    /// TOML file whose top-level keys become the configuration source
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override a setting (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Identity registered with the engine
    #[arg(long, default_value = "sample-relay")]
    application_id: String,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Run-loop tick in milliseconds
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Expose Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Run as an interactive application rather than a detached service
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Decided once, before anything else can fail
    let startup_log = StartupLog::detect();

    logging::init_logging(cli.log_level.as_deref());
    tracing::info!("worker-host v{} starting", env!("CARGO_PKG_VERSION"));

    let mut source = match &cli.config {
        Some(path) => load_config(path)?,
        None => MemoryConfigSource::new(),
    };
    source.merge(parse_overrides(&cli.overrides)?);
    tracing::info!(
        config = ?cli.config,
        keys = source.len(),
        "Configuration loaded"
    );

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    let (host_type, console): (HostType, Arc<dyn ConsoleProbe>) = if cli.interactive {
        (HostType::Application, Arc::new(StdinConsole))
    } else {
        (HostType::Service, Arc::new(DetachedConsole))
    };

    let master = MasterSwitch::new();
    let engine = Arc::new(StandaloneEngine::new(master.clone()));
    let lifetime = Arc::new(HostLifetime::new());
    let service = ServiceDefinition::new(cli.application_id, Arc::new(SampleRelay::default()))
        .with_host_type(host_type);

    let host = Arc::new(
        ServiceHost::builder(service, engine)
            .config(Arc::new(source))
            .base_settings(Arc::new(BaseSettings::new()))
            .lifetime(lifetime.clone())
            .master_switch(master)
            .console(console)
            .startup_log(startup_log)
            .tick(Duration::from_millis(cli.tick_ms))
            .build(),
    );

    signals::spawn_signal_listener(lifetime.clone());

    let runner = {
        let host = host.clone();
        let stopping = lifetime.stopping_token();
        tokio::spawn(async move { host.execute(stopping).await })
    };

    // Either a signal or the host itself requests the stop
    lifetime.stopping_token().cancelled().await;
    host.stop();

    let state = runner.await?;
    tracing::info!(state = ?state, "Shutdown complete");
    Ok(())
}
