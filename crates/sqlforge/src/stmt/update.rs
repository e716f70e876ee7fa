//! UPDATE statement builder.

use super::{Mutation, SqlStatement, Statement, StatementKind, target};
use crate::error::SqlResult;
use crate::exec::Executor;
use crate::expr::{IntoAnyExpr, IntoExpr};
use crate::ident::check_name;
use crate::value::SqlType;
use std::fmt;

/// UPDATE statement.
///
/// Assignments keep insertion order; setting a column twice overwrites the
/// first value in place. An UPDATE without assignments still renders but
/// fails [`validate`](SqlStatement::validate) and execution.
#[derive(Clone, PartialEq, Eq)]
pub struct UpdateStmt {
    stmt: Statement,
}

impl UpdateStmt {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            stmt: Statement::new(StatementKind::Update, SqlType::Unit, target(table)),
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    pub fn to_sql(&self) -> String {
        self.stmt.to_sql()
    }

    /// `SET column = value`. A blank column name is `InvalidArgument`.
    pub fn set(&self, column: &str, value: impl IntoAnyExpr) -> SqlResult<Self> {
        check_name("SET column name", column)?;
        let value = value.into_any_expr();
        Ok(Self {
            stmt: self.stmt.with(|c| c.assign(column, value)),
        })
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

    /// Append `RETURNING col, ...`.
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

impl fmt::Debug for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateStmt")
            .field("sql", &self.stmt.to_sql())
            .finish()
    }
}

impl fmt::Display for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stmt, f)
    }
}

impl SqlStatement for UpdateStmt {
    fn statement(&self) -> &Statement {
        &self.stmt
    }
}

impl Mutation for UpdateStmt {}

impl From<UpdateStmt> for Statement {
    fn from(update: UpdateStmt) -> Self {
        update.stmt
    }
}
