use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use engine_server::{serve, Config, RoomService, SessionRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).context("invalid log level")?)
        .init();

    info!(
        bind_addr = %config.bind_addr,
        auto_create_rooms = config.auto_create_rooms,
        "Starting room server"
    );

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let service = Arc::new(RoomService::new(SessionRegistry::new(
        config.auto_create_rooms,
    )));

    let stats_handle = config.stats_interval().map(|period| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let stats = service.stats();
                info!(
                    rooms = stats.rooms,
                    waiting = stats.waiting,
                    playing = stats.playing,
                    finished = stats.finished,
                    "Room statistics"
                );
            }
        })
    });

    let shutdown = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let result = serve(listener, service, config.max_line_bytes, shutdown).await;

    if let Some(handle) = stats_handle {
        handle.abort();
    }

    result.context("room server failed")
}
