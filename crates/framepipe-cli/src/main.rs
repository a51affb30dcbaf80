//! Framepipe CLI
//!
//! Client and server for a length-prefixed text protocol over a Unix
//! domain socket. `serve` runs the server; `send` streams file contents to
//! a running server and prints each response.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use framepipe_core::client::{FileClient, FileOutcome};
use framepipe_core::config::{LoggingConfig, PipeConfig};
use framepipe_core::server::PipeListener;

/// Length-prefixed file transport over a Unix domain socket.
#[derive(Parser)]
#[command(name = "framepipe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Override the socket path.
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Override the wire format (streaming or bounded).
    #[arg(short, long)]
    format: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the server.
    Serve,
    /// Send files to a running server and print the responses.
    Send {
        /// Files to send.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => PipeConfig::from_file(path)?,
        None => PipeConfig::default(),
    };

    // Apply CLI overrides
    if let Some(socket) = args.socket {
        config.socket.path = socket;
    }
    if let Some(format) = &args.format {
        config.wire.format = format.parse()?;
    }

    // Override log level from verbosity flag
    let log_config = match args.verbose {
        0 => config.logging.clone(),
        1 => LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        },
        _ => LoggingConfig {
            level: "trace".to_string(),
            ..config.logging.clone()
        },
    };

    // Setup tracing
    setup_tracing(&log_config);

    // Run the async runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match args.command {
        Command::Serve => runtime.block_on(run_server(config)),
        Command::Send { files } => runtime.block_on(run_client(config, files)),
    }
}

fn setup_tracing(config: &LoggingConfig) {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

async fn run_server(config: PipeConfig) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        socket = %config.socket.path.display(),
        format = %config.wire.format,
        "starting framepipe server"
    );

    let listener = PipeListener::new(config);
    let shutdown_handle = listener.shutdown_handle();

    // Handle shutdown signals
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, stopping server");
        let _ = shutdown_handle.send(());
    });

    listener.run().await?;

    info!("server shutdown complete");
    Ok(())
}

async fn run_client(config: PipeConfig, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let client = FileClient::new(config);
    let reports = client.run(&files).await?;

    let mut skipped = 0;
    for report in &reports {
        match &report.outcome {
            FileOutcome::Sent { response } => {
                println!("{response}");
            }
            FileOutcome::Skipped { reason } => {
                skipped += 1;
                warn!(path = %report.path.display(), %reason, "file skipped");
            }
        }
    }

    info!(
        sent = reports.len() - skipped,
        skipped,
        "client run complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
