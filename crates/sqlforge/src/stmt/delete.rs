//! DELETE statement builder.

use super::{Mutation, SqlStatement, Statement, StatementKind, target};
use crate::error::SqlResult;
use crate::exec::Executor;
use crate::expr::IntoExpr;
use crate::value::SqlType;
use std::fmt;

/// DELETE statement. Without a filter it renders `DELETE FROM t` and
/// removes every row.
#[derive(Clone, PartialEq, Eq)]
pub struct DeleteStmt {
    stmt: Statement,
}

impl DeleteStmt {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Delete, SqlType::Unit, target(table)),
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    pub fn to_sql(&self) -> String {
        self.stmt.to_sql()
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(&self, condition: impl IntoExpr<bool>) -> Self {
        let condition = condition.into_expr().into_any();
        Self {
            stmt: self.stmt.with(|c| c.filter = Some(condition)),
        }
    }

    /// AND `condition` onto the existing WHERE condition.
    pub fn and_filter(&self, condition: impl IntoExpr<bool>) -> Self {
        let condition = condition.into_expr().into_any();
        Self {
            stmt: self.stmt.with(|c| c.and_filter(condition)),
        }
    }

    pub fn returning<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        Self {
            stmt: self.stmt.with(|c| c.set_returning(columns)),
        }
    }

    /// Execute and return the affected row count.
    pub async fn execute(&self, exec: &impl Executor) -> SqlResult<u64> {
        exec.execute_update(self).await
    }
}

impl fmt::Debug for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteStmt")
            .field("sql", &self.stmt.to_sql())
            .finish()
    }
}

impl fmt::Display for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stmt, f)
    }
}

impl SqlStatement for DeleteStmt {
    fn statement(&self) -> &Statement {
        &self.stmt
    }
}

impl Mutation for DeleteStmt {}

impl From<DeleteStmt> for Statement {
    fn from(delete: DeleteStmt) -> Self {
        delete.stmt
    }
}
