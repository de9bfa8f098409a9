//! Search Gateway server
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use search_gateway::{
    config,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tavily-style search API backed by SearXNG
#[derive(Debug, Parser)]
#[command(name = "search-gateway", version, about)]
struct Args {
    /// Path to settings.yml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(bind) = args.bind {
        settings.server.bind_address = bind;
    }

    let default_filter = if settings.general.debug {
        "search_gateway=debug,tower_http=debug"
    } else {
        "search_gateway=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("Starting Search Gateway v{}", search_gateway::VERSION);

    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );
    if settings.server.api_key.is_some() {
        info!("API key authentication enabled");
    }

    let state = AppState::new(settings)?;
    let app = create_router(state);

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
