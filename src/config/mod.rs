mod file_config;

pub use file_config::{DatabaseFileConfig, FileConfig};

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Result};
use sqlx::mysql::MySqlConnectOptions;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_METRICS_PORT: u16 = 9091;
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_NAME: &str = "musicstore";
pub const DEFAULT_DB_POOL_SIZE: u32 = 10;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SEC: u64 = 5;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
/// Ports arrive as raw text since they may come from the environment, where
/// an empty value means unset.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: Option<String>,
    pub metrics_port: Option<String>,
    pub logging_level: RequestsLoggingLevel,
    pub request_timeout_sec: Option<u64>,
    pub db_host: Option<String>,
    pub db_port: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub db_name: Option<String>,
    pub db_pool_size: Option<u32>,
    pub db_acquire_timeout_sec: Option<u64>,
    pub sqlite_db: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub request_timeout: Duration,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone)]
pub enum DatabaseSettings {
    Mysql(MysqlSettings),
    Sqlite { path: PathBuf, pool_size: usize },
}

#[derive(Clone)]
pub struct MysqlSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    pub acquire_timeout: Duration,
}

impl MysqlSettings {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

// Hand-written so the password never ends up in logs.
impl fmt::Debug for MysqlSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("pool_size", &self.pool_size)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl fmt::Display for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseSettings::Mysql(mysql) => write!(
                f,
                "MySQL {}@{}:{}/{}",
                mysql.user, mysql.host, mysql.port, mysql.name
            ),
            DatabaseSettings::Sqlite { path, .. } => write!(f, "SQLite {:?}", path),
        }
    }
}

/// Unset and empty values both fall back.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_cli_value<T>(name: &str, value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value.filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|err| anyhow!("Invalid {}: '{}' ({})", name, raw, err)),
        None => Ok(None),
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let db_file = file.database.unwrap_or_default();

        let cli_port = parse_cli_value("port", cli.port.as_deref())?;
        let cli_metrics_port = parse_cli_value("metrics_port", cli.metrics_port.as_deref())?;
        let cli_db_port = parse_cli_value("db_port", cli.db_port.as_deref())?;

        let port = file.port.or(cli_port).unwrap_or(DEFAULT_PORT);
        let metrics_port = file
            .metrics_port
            .or(cli_metrics_port)
            .unwrap_or(DEFAULT_METRICS_PORT);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = match file.logging_level {
            Some(level) => match RequestsLoggingLevel::parse(&level) {
                Some(level) => level,
                None => bail!("Unknown logging_level in config file: {}", level),
            },
            None => cli.logging_level.clone(),
        };

        let request_timeout_sec = file
            .request_timeout_sec
            .or(cli.request_timeout_sec)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SEC);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        let pool_size = db_file
            .pool_size
            .or(cli.db_pool_size)
            .unwrap_or(DEFAULT_DB_POOL_SIZE);
        if pool_size == 0 {
            bail!("Database pool_size must be greater than 0");
        }

        let sqlite_path = non_empty(db_file.sqlite_path)
            .map(PathBuf::from)
            .or_else(|| cli.sqlite_db.clone());

        let database = match sqlite_path {
            Some(path) => DatabaseSettings::Sqlite {
                path,
                pool_size: pool_size as usize,
            },
            None => DatabaseSettings::Mysql(MysqlSettings {
                host: non_empty(db_file.host)
                    .or_else(|| non_empty(cli.db_host.clone()))
                    .unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: db_file.port.or(cli_db_port).unwrap_or(DEFAULT_DB_PORT),
                user: non_empty(db_file.user)
                    .or_else(|| non_empty(cli.db_user.clone()))
                    .unwrap_or_default(),
                password: non_empty(db_file.password)
                    .or_else(|| non_empty(cli.db_password.clone()))
                    .unwrap_or_default(),
                name: non_empty(db_file.name)
                    .or_else(|| non_empty(cli.db_name.clone()))
                    .unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                pool_size,
                acquire_timeout: Duration::from_secs(
                    db_file
                        .acquire_timeout_sec
                        .or(cli.db_acquire_timeout_sec)
                        .unwrap_or(DEFAULT_DB_ACQUIRE_TIMEOUT_SEC),
                ),
            }),
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            request_timeout: Duration::from_secs(request_timeout_sec),
            database,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            request_timeout: self.request_timeout,
        }
    }
}
