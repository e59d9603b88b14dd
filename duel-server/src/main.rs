use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use duel_persistence::{connection::connect_and_migrate, RoomRepository};
use duel_server::{
    catalog::{load_catalog, CatalogCache},
    config::Config,
    create_routes,
    realtime::RoomHub,
    room_service::RoomService,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting duel server...");

    let config = Config::new();

    // Fail fast if the word catalog is unusable; rooms cannot be created
    // without content.
    info!("Loading word catalog from: {}", config.words_file);
    match load_catalog(Path::new(&config.words_file)) {
        Ok(catalog) if catalog.is_empty() => {
            tracing::error!("Word catalog '{}' contains no words.", config.words_file);
            tracing::error!("Set WORDS_FILE to a JSON catalog with easy/medium/hard word lists.");
            std::process::exit(1);
        }
        Ok(_) => info!("Word catalog OK"),
        Err(e) => {
            tracing::error!("Failed to load word catalog '{}': {e:#}", config.words_file);
            tracing::error!("Set WORDS_FILE to a JSON catalog with easy/medium/hard word lists.");
            std::process::exit(1);
        }
    }

    let catalog = Arc::new(CatalogCache::new(
        config.words_file.clone(),
        Duration::from_secs(config.catalog_ttl_seconds),
    ));

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let hub = Arc::new(RoomHub::new());
    let service = Arc::new(RoomService::new(
        RoomRepository::new(db),
        catalog.clone(),
        hub.clone(),
        config.words_per_duel,
        config.seconds_per_word,
    ));

    let routes = create_routes(service.clone(), hub.clone(), catalog.clone());

    // Start cleanup task for waiting rooms nobody ever started
    let cleanup_service = service.clone();
    let retention = chrono::Duration::minutes(config.room_retention_minutes);
    let cleanup_interval = config.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(cleanup_interval));
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_service.cleanup_stale_rooms(retention).await {
                tracing::error!("stale room cleanup failed: {e}");
            }
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
