use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use scoovio_engine::adapters::memory_store::InMemoryStore;
use scoovio_engine::adapters::seed::load_seed;
use scoovio_engine::config::load_config;
use scoovio_engine::mcp::server::ScoovioMcpServer;
use scoovio_engine::ports::rental_store::RentalStore;
use scoovio_engine::service::BookingService;

fn find_config_path() -> PathBuf {
    let candidates = [PathBuf::from("config.yaml"), binary_dir().join("config.yaml")];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn binary_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting scoovio-engine server");

    let config_path = find_config_path();
    let config = load_config(&config_path)?;

    let store: Arc<dyn RentalStore> = match config.store.seed_path {
        Some(ref path) => {
            let seed = load_seed(path)?;
            tracing::info!(
                resources = seed.resources.len(),
                bookings = seed.bookings.len(),
                blackouts = seed.blackouts.len(),
                "Loading seed data from {}",
                path.display()
            );
            Arc::new(seed.into_store(config.availability.policy()).await?)
        }
        None => Arc::new(InMemoryStore::new()),
    };

    let service = Arc::new(BookingService::from_config(store, &config));
    let server = ScoovioMcpServer::new(service, config.pricing.currency.clone());

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
