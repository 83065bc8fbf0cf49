// src/main.rs
mod clock;
mod config;
mod db;
mod error;
mod expiration;
mod handlers;
mod models;
mod poll;
mod routes;
mod services;
mod store;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::clock::SystemClock;
use crate::config::{Config, StoreBackend};
use crate::db::PgStore;
use crate::services::PollService;
use crate::store::{MemoryStore, Store};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();

    let store = match build_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize store: {e}");
            process::exit(1);
        }
    };

    let service = PollService::new(store, Arc::new(SystemClock), config.store_timeout);
    let app = routes::create_routes(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server running on {addr} with {:?} store", config.backend);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!("Server error: {e}");
        process::exit(1);
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn Store>, String> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set for the postgres store")?;
            let pool = db::create_pool(url, config.max_connections)
                .await
                .map_err(|e| format!("Failed to connect to the database: {e}"))?;
            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .map_err(|e| format!("Failed to prepare schema: {e}"))?;
            Ok(Arc::new(store))
        }
    }
}
