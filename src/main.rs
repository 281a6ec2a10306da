use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musicstore_catalog_server::catalog_store::{
    CatalogStore, MysqlCatalogStore, SqliteCatalogStore,
};
use musicstore_catalog_server::config::{AppConfig, CliConfig, DatabaseSettings, FileConfig};
use musicstore_catalog_server::server::{self, run_server, RequestsLoggingLevel};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT")]
    pub port: Option<String>,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, env = "METRICS_PORT")]
    pub metrics_port: Option<String>,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Requests taking longer than this many seconds are aborted.
    #[clap(long)]
    pub request_timeout_sec: Option<u64>,

    /// MySQL server host.
    #[clap(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// MySQL server port.
    #[clap(long, env = "DB_PORT")]
    pub db_port: Option<String>,

    #[clap(long, env = "DB_USER")]
    pub db_user: Option<String>,

    #[clap(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Name of the catalog database.
    #[clap(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Maximum number of open database connections.
    #[clap(long)]
    pub db_pool_size: Option<u32>,

    /// Seconds to wait for a free connection before failing a query.
    #[clap(long)]
    pub db_acquire_timeout_sec: Option<u64>,

    /// Serve a SQLite catalog file instead of connecting to MySQL.
    #[clap(long)]
    pub sqlite_db: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port.clone(),
            metrics_port: self.metrics_port.clone(),
            logging_level: self.logging_level.clone(),
            request_timeout_sec: self.request_timeout_sec,
            db_host: self.db_host.clone(),
            db_port: self.db_port.clone(),
            db_user: self.db_user.clone(),
            db_password: self.db_password.clone(),
            db_name: self.db_name.clone(),
            db_pool_size: self.db_pool_size,
            db_acquire_timeout_sec: self.db_acquire_timeout_sec,
            sqlite_db: self.sqlite_db.clone(),
        }
    }
}

fn open_catalog_store(database: &DatabaseSettings) -> Result<Arc<dyn CatalogStore>> {
    Ok(match database {
        DatabaseSettings::Mysql(mysql) => Arc::new(MysqlCatalogStore::new(
            mysql.connect_options(),
            mysql.pool_size,
            mysql.acquire_timeout,
        )),
        DatabaseSettings::Sqlite { path, pool_size } => {
            Arc::new(SqliteCatalogStore::new(path, *pool_size)?)
        }
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested, draining in-flight requests..."),
        Err(err) => warn!("Could not listen for shutdown signal: {}", err),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before clap reads the environment.
    let dotenv_result = dotenvy::dotenv();

    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    if let Err(err) = dotenv_result {
        if err.not_found() {
            warn!("No .env file found, using process environment only");
        } else {
            warn!("Could not load .env file: {}", err);
        }
    }

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening catalog store ({})...", app_config.database);
    let catalog_store = open_catalog_store(&app_config.database)?;

    catalog_store
        .ping()
        .await
        .with_context(|| format!("Catalog database unreachable ({})", app_config.database))?;
    info!("Catalog database is reachable");

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    let result = run_server(
        app_config.server_config(),
        catalog_store.clone(),
        shutdown_signal(),
    )
    .await;

    catalog_store.close().await;
    info!("Catalog store closed");

    result
}
