// Job Configuration (immutable after startup)

use super::offset::OffsetStrategy;
use super::query::comparison_prefix;
use crate::error::{AppError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Select every column when no list is configured
pub const DEFAULT_COLUMNS_SELECT: &str = "*";

/// Delay between two polls (10s)
pub const DEFAULT_QUERY_DELAY: Duration = Duration::from_millis(10_000);

/// Offset used when no checkpoint is persisted yet
pub const DEFAULT_START_VALUE: i64 = 0;

/// Upper bound of rows materialized per poll
pub const DEFAULT_MAX_ROWS: u32 = 2000;

/// Charset used to decode binary cells
pub const DEFAULT_CHARSET_RESULTSET: &str = "UTF-8";

/// Database credentials for the source connection
///
/// All three fields are optional until [`JobConfig::validate`] runs, so that
/// a fallback resource can fill in whatever the primary config left out.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionSettings {
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            user: Some(user.into()),
            password: Some(password.into()),
        }
    }

    /// Fill missing fields from `fallback`
    pub fn or(self, fallback: ConnectionSettings) -> Self {
        Self {
            url: self.url.or(fallback.url),
            user: self.user.or(fallback.user),
            password: self.password.or(fallback.password),
        }
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

// Password stays out of logs
impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Charset applied to binary cell values during materialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultCharset {
    #[default]
    Utf8,
    Latin1,
}

impl ResultCharset {
    /// Decode raw bytes into text
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            ResultCharset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            // ISO-8859-1 maps every byte to the code point of the same value
            ResultCharset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl FromStr for ResultCharset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(ResultCharset::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" => Ok(ResultCharset::Latin1),
            other => Err(AppError::Config(format!(
                "unsupported result charset: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ResultCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCharset::Utf8 => write!(f, "UTF-8"),
            ResultCharset::Latin1 => write!(f, "ISO-8859-1"),
        }
    }
}

/// Configuration of one table-extraction job
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// Source table (required)
    pub table: String,
    /// Column list spliced into the default query (None = `*`)
    pub columns: Option<String>,
    /// User query whose value after the first `>` is replaced each cycle
    pub custom_query: Option<String>,
    pub poll_interval: Duration,
    pub start_from: i64,
    pub max_rows: u32,
    pub charset: String,
    pub offset_strategy: OffsetStrategy,
    pub connection: ConnectionSettings,
}

impl JobConfig {
    /// Create a config with defaults for everything but the table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            custom_query: None,
            poll_interval: DEFAULT_QUERY_DELAY,
            start_from: DEFAULT_START_VALUE,
            max_rows: DEFAULT_MAX_ROWS,
            charset: DEFAULT_CHARSET_RESULTSET.to_string(),
            offset_strategy: OffsetStrategy::default(),
            connection: ConnectionSettings::default(),
        }
    }

    pub fn with_columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn with_custom_query(mut self, query: impl Into<String>) -> Self {
        self.custom_query = Some(query.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_start_from(mut self, offset: i64) -> Self {
        self.start_from = offset;
        self
    }

    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_offset_strategy(mut self, strategy: OffsetStrategy) -> Self {
        self.offset_strategy = strategy;
        self
    }

    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    /// Columns for the default query
    pub fn columns_to_select(&self) -> &str {
        match self.columns.as_deref().map(str::trim) {
            Some(cols) if !cols.is_empty() => cols,
            _ => DEFAULT_COLUMNS_SELECT,
        }
    }

    pub fn result_charset(&self) -> Result<ResultCharset> {
        self.charset.parse()
    }

    /// Check mandatory properties
    ///
    /// Every failure here is fatal: the job must not start.
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(AppError::Config("property table not set".to_string()));
        }
        if is_blank(&self.connection.url) {
            return Err(AppError::Config(
                "connection.url property not set".to_string(),
            ));
        }
        if is_blank(&self.connection.user) {
            return Err(AppError::Config(
                "connection.user property not set".to_string(),
            ));
        }
        if self.connection.password.is_none() {
            return Err(AppError::Config(
                "connection.password property not set".to_string(),
            ));
        }
        if let Some(template) = &self.custom_query {
            comparison_prefix(template).map_err(|e| AppError::Config(e.to_string()))?;
        }
        if self.max_rows == 0 {
            return Err(AppError::Config("max_rows must be positive".to_string()));
        }
        if let OffsetStrategy::MaxId { column } = &self.offset_strategy {
            if column.trim().is_empty() {
                return Err(AppError::Config(
                    "max_id offset strategy needs an id column".to_string(),
                ));
            }
            if self.custom_query.is_none() && !selects_column(self.columns_to_select(), column) {
                return Err(AppError::Config(format!(
                    "max_id column {} is not in columns_to_select ({})",
                    column.trim(),
                    self.columns_to_select()
                )));
            }
        }
        self.result_charset()?;
        Ok(())
    }
}

/// Whether a select list yields `column`, matched by output name
///
/// `*` (bare or qualified) selects everything. Otherwise each item's
/// output name is its last word, so `o.id`, `t.code AS id` and `` `id` ``
/// all count as `id`.
fn selects_column(columns: &str, column: &str) -> bool {
    let wanted = column.trim().trim_matches(|c| c == '`' || c == '"');
    columns.split(',').any(|item| {
        let name = item.split_whitespace().last().unwrap_or_default();
        let name = name.rsplit('.').next().unwrap_or_default();
        let name = name.trim_matches(|c| c == '`' || c == '"');
        name == "*" || name.eq_ignore_ascii_case(wanted)
    })
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}
