//! cdp-inspector — Chrome DevTools Protocol endpoint for the current process.
//!
//! Serves the discovery endpoints and a WebSocket speaking CDP, with the
//! Runtime, Debugger and Profiler domains registered on every connection.
//! Point a DevTools front end at the printed URL to attach. The binary's
//! own notices go through the attached Runtime domains, so a front end that
//! has enabled Runtime sees them in its console.
//!
//! Usage:
//!   cdp-inspector                         # Default 127.0.0.1:9229
//!   cdp-inspector --port 0                # OS-assigned port
//!   cdp-inspector --debug                 # Log sent frames and unmatched calls

use std::path::PathBuf;

use anyhow::Context;
use cdp_domains::{Console, RuntimeSessions, register_builtin_domains};
use cdp_server::Dispatcher;
use cdp_transport::{TransportConfig, TransportServer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable that switches on diagnostics like `--debug`.
const DEBUG_ENV: &str = "CDP_INSPECTOR_DEBUG";

#[derive(Parser, Debug)]
#[command(name = "cdp-inspector", about = "Chrome DevTools Protocol inspector endpoint")]
struct Cli {
    /// Port to listen on (0 for OS-assigned)
    #[arg(long, default_value = "9229")]
    port: u16,

    /// Hostname to bind to
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,

    /// Maximum concurrent connections
    #[arg(long, default_value = "32")]
    max_connections: usize,

    /// Allow cross-origin requests to the discovery endpoints
    #[arg(long)]
    cors: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Log every sent frame and every unhandled method
    #[arg(long)]
    debug: bool,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn diagnostics(&self) -> bool {
        self.debug || std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty())
    }

    fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            port: self.port,
            hostname: self.hostname.clone(),
            diagnostics: self.diagnostics(),
            max_connections: Some(self.max_connections),
            enable_cors: self.cors,
            ..TransportConfig::default()
        }
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if let Some(ref log_path) = cli.log_file {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();

        eprintln!("Logging to {}", log_path.display());
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = cli.transport_config();
    if config.diagnostics {
        info!("Diagnostics enabled");
    }

    let sessions = RuntimeSessions::new();
    let tracked = sessions.clone();
    let mut transport = TransportServer::start(config, move |dispatcher: &mut Dispatcher| {
        tracked.track(&register_builtin_domains(dispatcher));
    })
    .await
    .context("Failed to start transport")?;

    let port = transport.port();
    println!();
    println!("  Debugger listening on ws://{}:{port}/", cli.hostname);
    println!("  Discovery:  http://{}:{port}/json/list", cli.hostname);
    println!();
    println!("  Press Ctrl+C to stop.");
    println!();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    println!();
    println!("  Shutting down...");
    sessions.info(&[format!("Inspector shutting down ({} attached)", sessions.len()).into()]);
    transport.stop().await;
    println!("  Server stopped.");
    Ok(())
}
