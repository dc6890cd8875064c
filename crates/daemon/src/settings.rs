// Daemon settings: fallback properties, config file, environment

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;
use tablepoll_core::domain::{ConnectionSettings, JobConfig, OffsetStrategy};
use tablepoll_core::error::{AppError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "tablepoll.toml";
pub const FALLBACK_PROPERTIES_FILE: &str = "jdbc.properties";
pub const DEFAULT_METADATA_DB: &str = "~/.tablepoll/meta.db";

/// Top-level daemon settings
///
/// Every job field is optional here; defaults live in [`JobConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub table: Option<String>,
    pub columns_to_select: Option<String>,
    pub custom_query: Option<String>,
    pub run_query_delay_ms: Option<u64>,
    pub start_from: Option<i64>,
    pub max_rows: Option<u32>,
    pub charset: Option<String>,
    pub offset_strategy: Option<String>,
    pub id_column: Option<String>,
    pub connection: ConnectionSection,
    pub metadata_db: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Keys of the fallback `jdbc.properties` resource
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FallbackProperties {
    #[serde(rename = "dbUrl", alias = "dburl")]
    db_url: Option<String>,
    #[serde(rename = "dbUser", alias = "dbuser")]
    db_user: Option<String>,
    #[serde(rename = "dbPassword", alias = "dbpassword")]
    db_password: Option<String>,
}

impl Settings {
    /// Load from `TABLEPOLL_CONFIG` (or `tablepoll.toml`) and `TABLEPOLL__*`
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("TABLEPOLL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let cfg = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(environment())
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> anyhow::Result<Self> {
        Ok(cfg.try_deserialize()?)
    }

    /// Resolved path of the checkpoint database
    pub fn metadata_db(&self) -> String {
        let raw = self.metadata_db.as_deref().unwrap_or(DEFAULT_METADATA_DB);
        shellexpand::tilde(raw).into_owned()
    }

    /// Build the job configuration, filling connection gaps from `fallback`
    pub fn job_config(&self, fallback: ConnectionSettings) -> Result<JobConfig> {
        let connection = ConnectionSettings {
            url: self.connection.url.clone(),
            user: self.connection.user.clone(),
            password: self.connection.password.clone(),
        }
        .or(fallback);
        let connection = ConnectionSettings {
            url: connection.url.map(|url| normalize_url(&url)),
            ..connection
        };

        let strategy = OffsetStrategy::from_setting(
            self.offset_strategy.as_deref().unwrap_or_default(),
            self.id_column.as_deref(),
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        let mut job = JobConfig::new(self.table.clone().unwrap_or_default())
            .with_offset_strategy(strategy)
            .with_connection(connection);
        if let Some(columns) = &self.columns_to_select {
            job = job.with_columns(columns.clone());
        }
        if let Some(query) = &self.custom_query {
            job = job.with_custom_query(query.clone());
        }
        if let Some(delay) = self.run_query_delay_ms {
            job = job.with_poll_interval(Duration::from_millis(delay));
        }
        if let Some(start) = self.start_from {
            job = job.with_start_from(start);
        }
        if let Some(max_rows) = self.max_rows {
            job = job.with_max_rows(max_rows);
        }
        if let Some(charset) = &self.charset {
            job = job.with_charset(charset.clone());
        }
        Ok(job)
    }
}

/// `TABLEPOLL__*` variables, `__` separating nested keys
///
/// Values stay strings: numeric fields are converted on deserialize, and
/// credentials such as `007` must not be re-typed on the way in.
fn environment() -> Environment {
    Environment::with_prefix("TABLEPOLL")
        .prefix_separator("__")
        .separator("__")
}

/// Read connection defaults from the fallback properties file, if present
pub fn load_fallback(path: &str) -> anyhow::Result<ConnectionSettings> {
    let cfg = Config::builder()
        .add_source(File::new(path, FileFormat::Ini).required(false))
        .build()?;
    fallback_from_config(cfg)
}

fn fallback_from_config(cfg: Config) -> anyhow::Result<ConnectionSettings> {
    let props: FallbackProperties = cfg.try_deserialize()?;
    Ok(ConnectionSettings {
        url: props.db_url,
        user: props.db_user,
        password: props.db_password,
    })
}

/// Accept JDBC-style URLs (`jdbc:mysql://...`) by dropping the prefix
fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed.strip_prefix("jdbc:").unwrap_or(trimmed).to_string()
}
