//! qrgate Gateway - resolution surface for shareable links
//!
//! Serves the one wire-level contract the core defines, `{origin}/qr/{id}`:
//! gate status, password/note submission, and the released target. The
//! gateway is read-only with respect to policies; the only thing it ever
//! writes is the best-effort access log.

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Result;
use axum::http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod config;
mod http;
mod state;

use config::Config;
use state::State;

/// qrgate Gateway - resolution surface for shareable links
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Seed a demo storage tree and share on startup
    #[arg(long)]
    demo: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level: tracing::Level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_filter(env_filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::info!("Starting qrgate Gateway");

    // Create configuration
    let mut config = Config::default();
    config.seed_demo = args.demo;
    config.log_level = log_level;

    // Create state
    let state = match State::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create gateway state: {}", e);
            std::process::exit(1);
        }
    };

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let graceful_shutdown = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
        tracing::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    };
    tokio::spawn(graceful_shutdown);

    // Build gateway router
    let listen_addr = SocketAddr::from_str(&format!("0.0.0.0:{}", args.port))?;
    let router = build_gateway_router(state);

    tracing::info!("Gateway listening on {}", listen_addr);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    let mut server_rx = shutdown_rx.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = server_rx.changed().await;
        })
        .await?;

    tracing::info!("Gateway shutdown complete");
    Ok(())
}

/// Build the gateway router with resolution and health routes
fn build_gateway_router(state: State) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(vec![ACCEPT, ORIGIN, CONTENT_TYPE])
        .allow_origin(Any)
        .allow_credentials(false);

    let trace_layer = TraceLayer::new_for_http();

    Router::new()
        // Resolution routes for shareable links
        .route(
            "/qr/:id",
            get(http::resolve::status_handler).post(http::resolve::resolve_handler),
        )
        // Health check routes
        .nest("/_status", http::health::router())
        .with_state(state)
        .layer(cors_layer)
        .layer(trace_layer)
}
