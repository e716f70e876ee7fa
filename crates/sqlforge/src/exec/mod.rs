//! Statement execution.
//!
//! [`Executor`] is the pluggable boundary between statements and a database.
//! A backend implements two primitives, running row-returning SQL and
//! running a command, and inherits the typed operations on top of them.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::NoTls).await?;
//! tokio::spawn(connection);
//!
//! let users = Table::new("users");
//! let names: Vec<String> = client
//!     .execute_query(&select().from(&users).select(users.column::<String>("name")))
//!     .await?;
//! ```

mod config;
mod instrumented;
mod postgres;

pub use config::ExecConfig;
pub use instrumented::InstrumentedExecutor;
pub use postgres::{row_to_record, sql_type_of};

use crate::error::{SqlError, SqlResult};
use crate::stmt::{InsertStmt, Mutation, SelectStmt, SqlStatement, Statement, StatementKind};
use crate::value::{FromRecord, Record};

/// Runs rendered SQL against a backend and maps rows to typed values.
pub trait Executor: Send + Sync {
    /// Run a row-returning statement and decode every row.
    fn query_records(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = SqlResult<Vec<Record>>> + Send;

    /// Run a command and return the affected row count.
    fn execute_sql(&self, sql: &str) -> impl std::future::Future<Output = SqlResult<u64>> + Send;

    /// Run a SELECT and map every row to its declared result type.
    fn execute_query<T: FromRecord + Send>(
        &self,
        select: &SelectStmt<T>,
    ) -> impl std::future::Future<Output = SqlResult<Vec<T>>> + Send {
        async move {
            select.validate()?;
            let records = self.query_records(&select.to_sql()).await?;
            records.into_iter().map(T::from_record).collect()
        }
    }

    /// Count the rows a SELECT would return.
    ///
    /// Runs `SELECT COUNT(*) FROM (<select>) AS count_query`.
    fn execute_count<T>(
        &self,
        select: &SelectStmt<T>,
    ) -> impl std::future::Future<Output = SqlResult<i64>> + Send {
        async move {
            select.validate()?;
            let sql = format!("SELECT COUNT(*) FROM ({}) AS count_query", select.to_sql());
            let records = self.query_records(&sql).await?;
            let record = records
                .into_iter()
                .next()
                .ok_or_else(|| SqlError::not_found("COUNT query returned no rows"))?;
            record.try_get::<i64>(0)
        }
    }

    /// Run an INSERT, UPDATE or DELETE and return the affected row count.
    fn execute_update<M: Mutation>(
        &self,
        stmt: &M,
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send {
        async move {
            stmt.validate()?;
            self.execute_sql(&stmt.to_sql()).await
        }
    }

    /// Run an INSERT and read back the generated keys.
    ///
    /// The statement must name the key columns with `returning(...)`;
    /// otherwise this fails with [`SqlError::InvalidState`].
    fn execute_insert<K: FromRecord + Send>(
        &self,
        insert: &InsertStmt<K>,
    ) -> impl std::future::Future<Output = SqlResult<Vec<K>>> + Send {
        async move {
            insert.validate()?;
            if insert.statement().clauses().returning().is_empty() {
                return Err(SqlError::invalid_state(
                    "execute_insert requires RETURNING to read generated keys",
                ));
            }
            let records = self.query_records(&insert.to_sql()).await?;
            records.into_iter().map(K::from_record).collect()
        }
    }

    /// Run a SELECT that must return exactly one row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`SqlError::NotFound`]
    /// - 1 row: returns that row
    /// - multiple rows: returns [`SqlError::TooManyRows`]
    fn fetch_one<T: FromRecord + Send>(
        &self,
        select: &SelectStmt<T>,
    ) -> impl std::future::Future<Output = SqlResult<T>> + Send {
        async move {
            match self.fetch_optional(select).await? {
                Some(row) => Ok(row),
                None => Err(SqlError::not_found("Expected one row, got none")),
            }
        }
    }

    /// Run a SELECT that returns zero or one row; more is [`SqlError::TooManyRows`].
    fn fetch_optional<T: FromRecord + Send>(
        &self,
        select: &SelectStmt<T>,
    ) -> impl std::future::Future<Output = SqlResult<Option<T>>> + Send {
        async move {
            let mut rows = self.execute_query(select).await?;
            match rows.len() {
                0 | 1 => Ok(rows.pop()),
                found => Err(SqlError::TooManyRows { expected: 1, found }),
            }
        }
    }

    /// Run a SELECT under `LIMIT 1` and return its first row, if any.
    fn fetch_first<T: FromRecord + Send>(
        &self,
        select: &SelectStmt<T>,
    ) -> impl std::future::Future<Output = SqlResult<Option<T>>> + Send {
        async move {
            let limited = select.limit(1)?;
            let rows = self.execute_query(&limited).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Fetch rows for a kind-erased statement. Only SELECT returns rows.
    fn fetch_records(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = SqlResult<Vec<Record>>> + Send {
        async move {
            stmt.require(&[StatementKind::Select], "row fetch")?;
            stmt.validate()?;
            self.query_records(&stmt.to_sql()).await
        }
    }

    /// Execute a kind-erased INSERT, UPDATE or DELETE.
    fn execute_statement(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send {
        async move {
            stmt.require(
                &[StatementKind::Insert, StatementKind::Update, StatementKind::Delete],
                "execute_update",
            )?;
            stmt.validate()?;
            self.execute_sql(&stmt.to_sql()).await
        }
    }
}
