// src/main.rs
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;

use rustaradise::config::Config;
use rustaradise::diagnostics::{Diagnostics, LogDiagnostics};
use rustaradise::directory::{run_repoll, ServerDirectory};
use rustaradise::handlers;
use rustaradise::live::{HttpLiveSource, LiveOverlayCache, SystemClock};
use rustaradise::storage::catalog::CatalogStore;
use rustaradise::storage::file::FileStore;
use rustaradise::storage::memory::MemoryStore;
use rustaradise::storage::KeyValueStore;
use rustaradise::users::UserRegistry;
use rustaradise::utils::RefreshLimiter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Load configuration
    let config = Config::from_env();
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(LogDiagnostics);

    let store: Arc<dyn KeyValueStore> = match &config.data_dir {
        Some(dir) => {
            let store = FileStore::open(dir).map_err(|e| {
                error!("Failed to open data directory {}: {}", dir.display(), e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            info!("Using data directory {}", dir.display());
            Arc::new(store)
        }
        None => {
            info!("No DATA_DIR set, data lives in memory for this run");
            Arc::new(MemoryStore::new())
        }
    };

    let source = HttpLiveSource::new(config.live_fetch_timeout()).map_err(|e| {
        error!("Failed to build HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let overlay = LiveOverlayCache::new(
        Arc::new(source),
        Arc::new(SystemClock),
        diagnostics.clone(),
        config.live_data_ttl(),
    );

    let catalog = CatalogStore::new(store.clone(), diagnostics.clone());
    info!("Catalog holds {} servers", catalog.load().len());

    let directory = web::Data::new(ServerDirectory::new(catalog, overlay));
    let users = web::Data::new(UserRegistry::new(store, diagnostics));
    let refresh_rate_limiter: web::Data<RefreshLimiter> =
        web::Data::new(RefreshLimiter::keyed(config.refresh_quota()));

    actix_web::rt::spawn(run_repoll(
        directory.clone().into_inner(),
        config.repoll_interval(),
    ));

    let bind = config.bind();
    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(directory.clone())
            .app_data(users.clone())
            .app_data(refresh_rate_limiter.clone())
            .configure(handlers::configure)
    })
        .bind(&bind)?
        .run().await
}
