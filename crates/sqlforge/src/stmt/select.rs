//! SELECT statement builder.

use super::clauses::{Join, JoinKind, OrderBy, non_negative};
use super::{SqlStatement, Statement, StatementKind};
use crate::error::{SqlError, SqlResult};
use crate::exec::Executor;
use crate::expr::{Expr, IntoExpr, IntoExprList, Table, subquery};
use crate::value::{FromRecord, Record, SqlType, SqlTyped};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// SELECT statement whose rows map to `T`.
pub struct SelectStmt<T> {
    stmt: Statement,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Clone for SelectStmt<T> {
    fn clone(&self) -> Self {
        Self {
            stmt: self.stmt.clone(),
            _ty: PhantomData,
        }
    }
}

impl<T> PartialEq for SelectStmt<T> {
    fn eq(&self, other: &Self) -> bool {
        self.stmt == other.stmt
    }
}

impl<T> Eq for SelectStmt<T> {}

impl<T> Hash for SelectStmt<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stmt.hash(state);
    }
}

impl<T> fmt::Debug for SelectStmt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectStmt")
            .field("sql", &self.stmt.to_sql())
            .field("result_type", &self.stmt.result_type())
            .finish()
    }
}

impl<T> fmt::Display for SelectStmt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stmt, f)
    }
}

impl<T: SqlTyped> Default for SelectStmt<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SelectStmt<T> {
    fn wrap(stmt: Statement) -> Self {
        Self {
            stmt,
            _ty: PhantomData,
        }
    }

    fn map(&self, f: impl FnOnce(&mut super::ClauseBag)) -> Self {
        Self::wrap(self.stmt.with(f))
    }

    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    pub fn into_statement(self) -> Statement {
        self.stmt
    }

    pub fn result_type(&self) -> SqlType {
        self.stmt.result_type()
    }

    /// Render the SQL text.
    pub fn to_sql(&self) -> String {
        self.stmt.to_sql()
    }

    // ==================== FROM / JOIN ====================

    /// Set the FROM table. `Table::new("users").alias("u")` renders `FROM users u`.
    pub fn from(&self, table: impl Into<Table>) -> Self {
        let table = table.into();
        self.map(|c| c.table = Some(table))
    }

    pub fn join(&self, kind: JoinKind, table: impl Into<Table>, on: impl IntoExpr<bool>) -> Self {
        let join = Join {
            kind,
            table: table.into(),
            on: on.into_expr().into_any(),
        };
        self.map(|c| c.joins.push(join))
    }

    /// Add INNER JOIN.
    pub fn inner_join(&self, table: impl Into<Table>, on: impl IntoExpr<bool>) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Add LEFT JOIN.
    pub fn left_join(&self, table: impl Into<Table>, on: impl IntoExpr<bool>) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(&self, table: impl Into<Table>, on: impl IntoExpr<bool>) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(&self, condition: impl IntoExpr<bool>) -> Self {
        let condition = condition.into_expr().into_any();
        self.map(|c| c.filter = Some(condition))
    }

    /// AND `condition` onto the existing WHERE condition.
    pub fn and_filter(&self, condition: impl IntoExpr<bool>) -> Self {
        let condition = condition.into_expr().into_any();
        self.map(|c| c.and_filter(condition))
    }

    /// Append GROUP BY expressions.
    pub fn group_by(&self, exprs: impl IntoExprList) -> Self {
        let exprs = exprs.into_expr_list();
        self.map(|c| c.group_by.extend(exprs))
    }

    pub fn having(&self, condition: impl IntoExpr<bool>) -> Self {
        let condition = condition.into_expr().into_any();
        self.map(|c| c.having = Some(condition))
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    /// Append an ORDER BY item; bare expressions sort ascending.
    pub fn order_by(&self, order: impl Into<OrderBy>) -> Self {
        let order = order.into();
        self.map(|c| c.order_by.push(order))
    }

    pub fn limit(&self, limit: i64) -> SqlResult<Self> {
        let limit = non_negative(limit, "LIMIT")?;
        Ok(self.map(|c| c.limit = Some(limit)))
    }

    pub fn offset(&self, offset: i64) -> SqlResult<Self> {
        let offset = non_negative(offset, "OFFSET")?;
        Ok(self.map(|c| c.offset = Some(offset)))
    }

    /// LIMIT/OFFSET for a 1-based page number.
    pub fn paginate(&self, page: i64, per_page: i64) -> SqlResult<Self> {
        if page < 1 {
            return Err(SqlError::invalid_argument(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if per_page < 1 {
            return Err(SqlError::invalid_argument(format!(
                "per_page must be >= 1, got {per_page}"
            )));
        }
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| SqlError::invalid_argument("page offset overflows"))?;
        self.limit(per_page)?.offset(offset)
    }
}

impl<T: SqlTyped> SelectStmt<T> {
    pub(crate) fn new() -> Self {
        Self::wrap(Statement::new(StatementKind::Select, T::SQL_TYPE, None))
    }

    /// Select a single expression; rows now map to its type.
    pub fn select<R: SqlTyped>(&self, expr: impl IntoExpr<R>) -> SelectStmt<R> {
        let expr = expr.into_expr().into_any();
        SelectStmt::wrap(
            self.stmt
                .with(|c| c.projection = vec![expr])
                .with_result_type(R::SQL_TYPE),
        )
    }

    /// Select several expressions; rows now map to [`Record`].
    pub fn select_many(&self, exprs: impl IntoExprList) -> SelectStmt<Record> {
        let exprs = exprs.into_expr_list();
        SelectStmt::wrap(
            self.stmt
                .with(|c| c.projection = exprs)
                .with_result_type(SqlType::Record),
        )
    }

    /// This SELECT as a subquery expression.
    pub fn as_subquery(&self) -> Expr<T> {
        subquery(self)
    }
}

impl<T: FromRecord + Send> SelectStmt<T> {
    /// Fetch all rows.
    pub async fn fetch_all(&self, exec: &impl Executor) -> SqlResult<Vec<T>> {
        exec.execute_query(self).await
    }

    /// Fetch exactly one row.
    pub async fn fetch_one(&self, exec: &impl Executor) -> SqlResult<T> {
        exec.fetch_one(self).await
    }

    /// Fetch zero or one row.
    pub async fn fetch_optional(&self, exec: &impl Executor) -> SqlResult<Option<T>> {
        exec.fetch_optional(self).await
    }

    /// Fetch the first row under `LIMIT 1`.
    pub async fn fetch_first(&self, exec: &impl Executor) -> SqlResult<Option<T>> {
        exec.fetch_first(self).await
    }

    /// Count the rows this SELECT would return.
    pub async fn fetch_count(&self, exec: &impl Executor) -> SqlResult<i64> {
        exec.execute_count(self).await
    }
}

impl<T> SqlStatement for SelectStmt<T> {
    fn statement(&self) -> &Statement {
        &self.stmt
    }
}

impl<T> From<SelectStmt<T>> for Statement {
    fn from(select: SelectStmt<T>) -> Self {
        select.stmt
    }
}
