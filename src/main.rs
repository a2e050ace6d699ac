//! page-counter server binary.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use page_counter::config::resolve_config;
use page_counter::http::HttpServer;
use page_counter::lifecycle::{signals, Shutdown};
use page_counter::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "page-counter")]
#[command(about = "HTTP API counting pages of remote DOCX and PPTX files", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "PAGE_COUNTER_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port, overrides the configured bind address port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(args.config.as_deref(), args.port)?;

    logging::init_logging(&config.observability);

    tracing::info!("page-counter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        download_timeout_secs = config.download.timeout_secs,
        max_download_bytes = config.download.max_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "API endpoint: POST /api/count-pages"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
