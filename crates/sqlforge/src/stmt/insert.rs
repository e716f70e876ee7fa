//! INSERT statement builder.

use super::{Mutation, SelectStmt, SqlStatement, Statement, StatementKind, target};
use crate::error::SqlResult;
use crate::exec::Executor;
use crate::expr::IntoExprList;
use crate::value::{FromRecord, SqlType, SqlTyped};
use std::fmt;
use std::marker::PhantomData;

/// INSERT statement whose generated keys are `K`.
///
/// Rows come either from [`values`](Self::values) or from a nested SELECT via
/// [`from_select`](Self::from_select); setting one clears the other.
pub struct InsertStmt<K = i64> {
    stmt: Statement,
    _key: PhantomData<fn() -> K>,
}

impl<K> Clone for InsertStmt<K> {
    fn clone(&self) -> Self {
        Self::wrap(self.stmt.clone())
    }
}

impl<K> PartialEq for InsertStmt<K> {
    fn eq(&self, other: &Self) -> bool {
        self.stmt == other.stmt
    }
}

impl<K> Eq for InsertStmt<K> {}

impl<K> fmt::Debug for InsertStmt<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertStmt")
            .field("sql", &self.stmt.to_sql())
            .finish()
    }
}

impl<K> fmt::Display for InsertStmt<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stmt, f)
    }
}

impl<K> InsertStmt<K> {
    fn wrap(stmt: Statement) -> Self {
        Self {
            stmt,
            _key: PhantomData,
        }
    }

    pub(crate) fn new(table: &str) -> Self {
        Self::wrap(Statement::new(StatementKind::Insert, SqlType::Unit, target(table)))
    }

    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    pub fn to_sql(&self) -> String {
        self.stmt.to_sql()
    }

    /// Set the column list; every value row must then have this many values.
    pub fn columns<I, S>(&self, columns: I) -> SqlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        self.stmt.try_with(|c| c.set_columns(columns)).map(Self::wrap)
    }

    /// Append one value row, e.g. `.values(("Alice", 25))?`.
    pub fn values(&self, row: impl IntoExprList) -> SqlResult<Self> {
        let row = row.into_expr_list();
        self.stmt.try_with(|c| c.push_row(row)).map(Self::wrap)
    }

    /// Take rows from a SELECT instead of VALUES.
    pub fn from_select<S>(&self, select: &SelectStmt<S>) -> Self {
        let source = select.statement().clone();
        Self::wrap(self.stmt.with(|c| c.set_source(source)))
    }

    /// Append `RETURNING col, ...`; needed to read generated keys.
    pub fn returning<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        Self::wrap(self.stmt.with(|c| c.set_returning(columns)))
    }

    /// Execute and return the affected row count.
    pub async fn execute(&self, exec: &impl Executor) -> SqlResult<u64> {
        exec.execute_update(self).await
    }
}

impl<K: SqlTyped + FromRecord + Send> InsertStmt<K> {
    /// Execute and return the generated keys named by [`returning`](Self::returning).
    pub async fn execute_returning(&self, exec: &impl Executor) -> SqlResult<Vec<K>> {
        exec.execute_insert(self).await
    }
}

impl<K> SqlStatement for InsertStmt<K> {
    fn statement(&self) -> &Statement {
        &self.stmt
    }
}

impl<K> Mutation for InsertStmt<K> {}

impl<K> From<InsertStmt<K>> for Statement {
    fn from(insert: InsertStmt<K>) -> Self {
        insert.stmt
    }
}
