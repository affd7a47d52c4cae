#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tool for the GTD map.
//!
//! ```text
//! gtd_map_cli serve [--bind 0.0.0.0] [--port 8080] [--static-dir app/dist]
//! gtd_map_cli export [--output attacks.csv] [--country Iraq] [--min-kills 10]
//! gtd_map_cli summary [--year 2014]
//! gtd_map_cli options
//! ```
//!
//! Every subcommand accepts `--db` to point at the GTD `SQLite` file;
//! without it `GTD_DB_PATH` (or `data/gtd.db`) is used.

use std::io::{BufWriter, Write as _};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gtd_map_database::{DbError, db, export, queries};
use gtd_map_database_models::{BoundingBox, IncidentFilter};
use gtd_map_incident_models::IncidentField;
use gtd_map_server::ServerConfig;
use switchy_database::Database;

#[derive(Parser)]
#[command(
    name = "gtd_map_cli",
    about = "Serve, summarize, and export the Global Terrorism Database"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind to (default: `BIND_ADDR` or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (default: `PORT` or 8080)
        #[arg(long)]
        port: Option<u16>,
        /// Path to the GTD `SQLite` file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Directory with the built frontend to serve at `/`
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Export matching incidents as CSV
    Export {
        /// Path to the GTD `SQLite` file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print summary statistics as JSON
    Summary {
        /// Path to the GTD `SQLite` file
        #[arg(long)]
        db: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the distinct values of every filterable field as JSON
    Options {
        /// Path to the GTD `SQLite` file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

/// Filters shared by `export` and `summary`.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Exact year
    #[arg(long)]
    year: Option<i32>,
    /// Exact country name
    #[arg(long)]
    country: Option<String>,
    /// Exact perpetrator group name
    #[arg(long)]
    group: Option<String>,
    /// Exact attack type label
    #[arg(long)]
    attack_type: Option<String>,
    /// Exact weapon type label
    #[arg(long)]
    weapon_type: Option<String>,
    /// Minimum kill count
    #[arg(long, default_value = "0")]
    min_kills: u32,
    /// Bounding box as `minLon,minLat,maxLon,maxLat`
    #[arg(long)]
    bbox: Option<String>,
}

impl FilterArgs {
    fn into_filter(self) -> IncidentFilter {
        let bbox = self.bbox.as_deref().and_then(|raw| {
            let parsed = BoundingBox::parse(raw);
            if parsed.is_none() {
                log::warn!("Ignoring malformed bounding box {raw:?}");
            }
            parsed
        });

        IncidentFilter {
            year: self.year,
            country: self.country.filter(|s| !s.is_empty()),
            group: self.group.filter(|s| !s.is_empty()),
            attack_type: self.attack_type.filter(|s| !s.is_empty()),
            weapon_type: self.weapon_type.filter(|s| !s.is_empty()),
            min_kills: self.min_kills,
            bbox,
        }
    }
}

fn open_db(path: Option<PathBuf>) -> Result<Box<dyn Database>, DbError> {
    path.map_or_else(db::open_from_env, |p| db::open(&p))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            port,
            db,
            static_dir,
        } => {
            let env = ServerConfig::from_env();
            let config = ServerConfig {
                bind_addr: bind.unwrap_or(env.bind_addr),
                port: port.unwrap_or(env.port),
                db_path: db.unwrap_or(env.db_path),
                static_dir: static_dir.or(env.static_dir),
            };

            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(gtd_map_server::run_server(config))
            })
            .await??;
        }
        Commands::Export { db, output, filter } => {
            let database = open_db(db)?;
            let filter = filter.into_filter();

            let written = if let Some(path) = output {
                let file = BufWriter::new(std::fs::File::create(&path)?);
                let written = export::export_csv(database.as_ref(), &filter, file).await?;
                log::info!("Wrote {written} incidents to {}", path.display());
                written
            } else {
                let stdout = std::io::stdout();
                export::export_csv(database.as_ref(), &filter, stdout.lock()).await?
            };

            log::debug!("Export finished ({written} rows)");
        }
        Commands::Summary { db, filter } => {
            let database = open_db(db)?;
            let summary = queries::summarize(database.as_ref(), &filter.into_filter()).await?;
            print_json(&summary)?;
        }
        Commands::Options { db } => {
            let database = open_db(db)?;
            let options = queries::filter_options(database.as_ref(), IncidentField::all()).await?;
            print_json(&options)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
