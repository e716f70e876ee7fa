use crate::error::{SqlError, SqlResult};
use std::time::Duration;

/// Environment variable holding the statement timeout in milliseconds.
pub const QUERY_TIMEOUT_ENV: &str = "SQLFORGE_QUERY_TIMEOUT_MS";
/// Environment variable holding the slow statement threshold in milliseconds.
pub const SLOW_QUERY_ENV: &str = "SQLFORGE_SLOW_QUERY_MS";

/// Configuration for [`InstrumentedExecutor`](super::InstrumentedExecutor).
///
/// By default there is no timeout, no slow threshold, logging is on and SQL
/// is truncated to 200 chars in log events.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Statement timeout. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are logged at WARN.
    pub slow_query_threshold: Option<Duration>,
    /// Whether per-statement events are emitted.
    pub logging_enabled: bool,
    /// Truncate logged SQL (in chars). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Level of the per-statement event.
    #[cfg(feature = "tracing")]
    pub level: tracing::Level,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            slow_query_threshold: None,
            logging_enabled: true,
            max_sql_length: Some(200),
            #[cfg(feature = "tracing")]
            level: tracing::Level::DEBUG,
        }
    }
}

impl ExecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read timeouts from `SQLFORGE_QUERY_TIMEOUT_MS` and `SQLFORGE_SLOW_QUERY_MS`.
    ///
    /// Unset variables keep their defaults; malformed values are rejected.
    pub fn from_env() -> SqlResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SqlResult<Self> {
        let mut config = Self::default();
        if let Some(ms) = parse_millis(QUERY_TIMEOUT_ENV, lookup(QUERY_TIMEOUT_ENV))? {
            config = config.with_query_timeout(ms);
        }
        if let Some(ms) = parse_millis(SLOW_QUERY_ENV, lookup(SLOW_QUERY_ENV))? {
            config = config.with_slow_query_threshold(ms);
        }
        Ok(config)
    }

    /// Set the statement timeout.
    ///
    /// Statements exceeding it fail with [`SqlError::Timeout`].
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn enable_logging(mut self) -> Self {
        self.logging_enabled = true;
        self
    }

    pub fn disable_logging(mut self) -> Self {
        self.logging_enabled = false;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Override the per-statement event level.
    #[cfg(feature = "tracing")]
    pub fn level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.chars().count() > max => {
                let cut = sql.char_indices().nth(max).map_or(sql.len(), |(i, _)| i);
                format!("{}...", &sql[..cut])
            }
            _ => sql.to_string(),
        }
    }

    pub(crate) fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| elapsed > threshold)
    }
}

fn parse_millis(key: &str, raw: Option<String>) -> SqlResult<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|ms| Some(Duration::from_millis(ms)))
        .map_err(|_| SqlError::invalid_argument(format!("{key} must be milliseconds, got {raw:?}")))
}
