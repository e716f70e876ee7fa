use super::{ExecConfig, Executor};
use crate::error::{SqlError, SqlResult};
use crate::value::Record;
use std::future::Future;
use std::time::{Duration, Instant};

/// Wraps an [`Executor`] with a statement timeout and per-statement logging.
///
/// ```ignore
/// let exec = InstrumentedExecutor::new(client)
///     .with_config(ExecConfig::new().with_query_timeout(Duration::from_secs(5)));
/// ```
pub struct InstrumentedExecutor<E> {
    inner: E,
    config: ExecConfig,
}

/// What a finished statement produced, for the log event.
enum Outcome<'a> {
    Rows(usize),
    Affected(u64),
    Failed(&'a SqlError),
}

impl<E: Executor> InstrumentedExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            config: ExecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Get a reference to the wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    async fn with_timeout<T, F>(&self, future: F) -> SqlResult<T>
    where
        F: Future<Output = SqlResult<T>> + Send,
    {
        match self.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .unwrap_or(Err(SqlError::Timeout(timeout))),
            None => future.await,
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn report(&self, sql: &str, elapsed: Duration, outcome: Outcome<'_>) {
        if !self.config.logging_enabled {
            return;
        }

        #[cfg(feature = "tracing")]
        {
            use tracing::Level;

            macro_rules! emit_at_level {
                ($level:expr, $($field:tt)*) => {
                    match $level {
                        Level::ERROR => tracing::error!($($field)*),
                        Level::WARN  => tracing::warn!($($field)*),
                        Level::INFO  => tracing::info!($($field)*),
                        Level::DEBUG => tracing::debug!($($field)*),
                        Level::TRACE => tracing::trace!($($field)*),
                    }
                };
            }

            let kind = sql.split_whitespace().next().unwrap_or("");
            let sql = self.config.truncate_sql(sql);
            let elapsed_ms = elapsed_millis(elapsed);
            match outcome {
                Outcome::Failed(err) => tracing::error!(
                    target: "sqlforge.sql",
                    kind,
                    sql = %sql,
                    elapsed_ms,
                    error = %err,
                ),
                Outcome::Rows(rows) if self.config.is_slow(elapsed) => tracing::warn!(
                    target: "sqlforge.sql",
                    kind,
                    sql = %sql,
                    elapsed_ms,
                    rows,
                    "slow statement",
                ),
                Outcome::Affected(affected) if self.config.is_slow(elapsed) => tracing::warn!(
                    target: "sqlforge.sql",
                    kind,
                    sql = %sql,
                    elapsed_ms,
                    affected,
                    "slow statement",
                ),
                Outcome::Rows(rows) => emit_at_level!(
                    self.config.level,
                    target: "sqlforge.sql",
                    kind,
                    sql = %sql,
                    elapsed_ms,
                    rows,
                ),
                Outcome::Affected(affected) => emit_at_level!(
                    self.config.level,
                    target: "sqlforge.sql",
                    kind,
                    sql = %sql,
                    elapsed_ms,
                    affected,
                ),
            }
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(super) fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl<E: Executor> Executor for InstrumentedExecutor<E> {
    async fn query_records(&self, sql: &str) -> SqlResult<Vec<Record>> {
        let start = Instant::now();
        let result = self.with_timeout(self.inner.query_records(sql)).await;
        let outcome = match &result {
            Ok(rows) => Outcome::Rows(rows.len()),
            Err(err) => Outcome::Failed(err),
        };
        self.report(sql, start.elapsed(), outcome);
        result
    }

    async fn execute_sql(&self, sql: &str) -> SqlResult<u64> {
        let start = Instant::now();
        let result = self.with_timeout(self.inner.execute_sql(sql)).await;
        let outcome = match &result {
            Ok(affected) => Outcome::Affected(*affected),
            Err(err) => Outcome::Failed(err),
        };
        self.report(sql, start.elapsed(), outcome);
        result
    }
}
