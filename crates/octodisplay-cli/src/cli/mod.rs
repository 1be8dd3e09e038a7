//! CLI entry and process wiring.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use octodisplay_core::config::{self, DrainPolicy};
use octodisplay_core::core::pollers::{self, PollerKind};
use octodisplay_core::core::queue::event_queue;
use octodisplay_core::core::shutdown::ShutdownCoordinator;
use octodisplay_core::core::interrupt;
use octodisplay_core::logging;
use octodisplay_core::source::OctoPrintClient;

/// Printed (with exit status 0) when host or API key is missing.
pub const USAGE_HINT: &str = "Need host and API key for showing info, use --help for info";

#[derive(Parser)]
#[command(name = "octodisplay")]
#[command(version)]
#[command(about = "Show OctoPrint job progress, temperatures and CPU load in the terminal")]
#[command(after_help = "Press q to quit.")]
struct Cli {
    /// OctoPrint host, as name[:port] or an http(s):// URL
    #[arg(value_name = "HOST")]
    host: Option<String>,

    /// OctoPrint API key
    #[arg(value_name = "API_KEY")]
    api_key: Option<String>,

    /// Extra positionals are accepted and ignored
    #[arg(hide = true)]
    _extra: Vec<String>,

    /// Apply every queued update on each tick instead of one per tick
    #[arg(long)]
    drain_all: bool,

    /// Write the diagnostic log here instead of the default location
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Read configuration from this file instead of $OCTODISPLAY_HOME/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let (Some(host), Some(api_key)) = (cli.host.as_deref(), cli.api_key.as_deref()) else {
        println!("{USAGE_HINT}");
        return Ok(());
    };

    let mut config = match cli.config.as_deref() {
        Some(path) => config::Config::load_from(path),
        None => config::Config::load(),
    }
    .context("load config")?;
    if cli.drain_all {
        config.display.drain = DrainPolicy::Full;
    }
    if let Some(path) = cli.log_file {
        config.log_file = Some(path);
    }

    let timeout = config
        .polling
        .progress_interval()
        .min(config.polling.temperature_interval());
    let source = Arc::new(OctoPrintClient::new(host, api_key)?.with_timeout(timeout));

    let _log_guard = logging::init(&config).context("init logging")?;
    tracing::info!(host = %source.base_url(), "start");

    let shutdown = ShutdownCoordinator::new();
    interrupt::init(shutdown.clone())?;

    // one worker per poller
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(PollerKind::ALL.len())
        .thread_name("poller")
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    let (tx, rx) = event_queue();
    pollers::spawn_all(rt.handle(), &shutdown, &source, &tx, &config.polling);
    drop(tx);

    let result = octodisplay_tui::run_display(rx, &config.display, &shutdown);

    // after the display exits, signal pollers to stop and wait for them
    tracing::info!("stopping threads");
    shutdown.signal_stop();
    rt.block_on(shutdown.await_all_stopped());
    tracing::info!("stop");

    result.map(|exit| tracing::debug!(?exit, "exiting"))
}
