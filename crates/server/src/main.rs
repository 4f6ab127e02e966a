use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use smsgate_server::config::GatewayConfig;
use smsgate_server::store::{GatewayStore, SeedData};
use smsgate_server::version::VERSION;
use smsgate_server::web::create_axum_router;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "smsgate.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info,tower_http=warn` if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("SMS gateway version: {VERSION}");
        return Ok(());
    }

    let args = Args::parse();

    // Logging needs the configured directory, so configuration errors go to stderr.
    let config = match GatewayConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load gateway configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&config.log_dir);
    info!("Starting SMS gateway, version: {}", VERSION);

    let store = Arc::new(GatewayStore::new(
        SeedData::demo(Utc::now(), &config.modem),
        config.timings(),
    ));
    let app = create_axum_router(store.clone());

    let addr: SocketAddr = match config.listen_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(address = %config.listen_address, error = %e, "Invalid listen address.");
            return Err(e.into());
        }
    };

    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.set_keepalive(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(1024)?;
    info!(address = %addr, "HTTP server listening with TCP Keepalive");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Box::new)?;

    store.shutdown();
    info!("SMS gateway stopped.");
    Ok(())
}
