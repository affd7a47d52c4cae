#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the GTD map application.
//!
//! Serves the read-only REST API over the Global Terrorism Database
//! `SQLite` file and, optionally, the built frontend. The store handle is
//! opened once at startup and shared by every worker through [`AppState`].

mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use gtd_map_database::{db, queries};
use gtd_map_database_models::IncidentFilter;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Read-only handle to the incident store.
    pub db: Arc<dyn Database>,
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Path of the GTD `SQLite` file.
    pub db_path: PathBuf,
    /// Directory holding the built frontend, served at `/`.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `GTD_DB_PATH` and `STATIC_DIR`.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            bind_addr,
            port,
            db_path: db::db_path_from_env(),
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        }
    }
}

/// Registers the `/api` routes.
///
/// `/api/attacks/summary` is registered before `/api/attacks/{id}` so the
/// literal segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/attacks", web::get().to(handlers::attacks))
            .route("/attacks/summary", web::get().to(handlers::summary))
            .route("/attacks/{id}", web::get().to(handlers::attack_by_id))
            .route("/search", web::get().to(handlers::search))
            .route("/search/options", web::get().to(handlers::search_options))
            .route("/filters", web::get().to(handlers::filters)),
    );
}

/// Starts the GTD map API server.
///
/// Opens the incident store, logs how many incidents it holds, and starts
/// the Actix-Web HTTP server. The caller provides the async runtime (e.g.
/// via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store cannot be opened, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Opening incident database at {}...", config.db_path.display());
    let db_conn =
        db::open(&config.db_path).map_err(|e| std::io::Error::other(e.to_string()))?;

    match queries::count_incidents(db_conn.as_ref(), &IncidentFilter::default()).await {
        Ok(count) => log::info!("Serving {count} incidents"),
        Err(e) => log::warn!("Incident store is not queryable yet: {e}"),
    }

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
    });
    let static_dir = config.static_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();
        let static_dir = static_dir.clone();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .configure(move |cfg| {
                // Serve frontend static files (production)
                if let Some(dir) = static_dir {
                    cfg.service(Files::new("/", dir).index_file("index.html"));
                }
            })
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests;
