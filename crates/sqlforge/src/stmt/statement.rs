use super::clauses::{ClauseBag, Join, JoinKind, OrderBy, non_negative};
use crate::error::{SqlError, SqlResult};
use crate::expr::{IntoExpr, IntoExprList, Table};
use crate::ident::{check_expr, check_name};
use crate::render::SqlRenderer;
use crate::value::SqlType;
use std::fmt;

/// The four statement shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind-erased statement.
///
/// Every typed builder converts into a `Statement`. Its mutators accept any
/// clause but fail with [`SqlError::UnsupportedOperation`] when the clause
/// does not exist for this statement's kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    kind: StatementKind,
    result_type: SqlType,
    clauses: ClauseBag,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, result_type: SqlType, table: Option<Table>) -> Self {
        Self {
            kind,
            result_type,
            clauses: ClauseBag {
                table,
                ..ClauseBag::default()
            },
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Declared type of each result row.
    pub fn result_type(&self) -> SqlType {
        self.result_type
    }

    pub fn clauses(&self) -> &ClauseBag {
        &self.clauses
    }

    /// Render the SQL text.
    pub fn to_sql(&self) -> String {
        SqlRenderer::new().statement(self)
    }

    /// Check that the statement can be sent to a backend.
    ///
    /// An UPDATE without assignments renders as `UPDATE t SET ` and is
    /// rejected here with [`SqlError::InvalidState`]. Blank table, column or
    /// alias names anywhere in the tree, subqueries included, are
    /// [`SqlError::InvalidArgument`].
    pub fn validate(&self) -> SqlResult<()> {
        let c = &self.clauses;
        if self.kind == StatementKind::Update && c.assignments.is_empty() {
            let table = c.table.as_ref().map_or("?", Table::name);
            return Err(SqlError::invalid_state(format!(
                "UPDATE {table} has no SET assignments"
            )));
        }

        if let Some(table) = &c.table {
            check_table(table)?;
        }
        for join in &c.joins {
            check_table(&join.table)?;
            check_expr(&join.on)?;
        }
        let exprs = c
            .projection
            .iter()
            .chain(&c.group_by)
            .chain(&c.filter)
            .chain(&c.having)
            .chain(c.order_by.iter().map(OrderBy::expr))
            .chain(c.rows.iter().flatten());
        for expr in exprs {
            check_expr(expr)?;
        }
        for (column, value) in &c.assignments {
            check_name("SET column name", column)?;
            check_expr(value)?;
        }
        for column in &c.returning {
            check_name("RETURNING column name", column)?;
        }

        if let Some(source) = &c.source {
            source.validate()?;
        }
        Ok(())
    }

    /// Copy-on-write: clone, apply `f` to the clauses, return the copy.
    pub(crate) fn with(&self, f: impl FnOnce(&mut ClauseBag)) -> Self {
        let mut next = self.clone();
        f(&mut next.clauses);
        next
    }

    pub(crate) fn try_with(&self, f: impl FnOnce(&mut ClauseBag) -> SqlResult<()>) -> SqlResult<Self> {
        let mut next = self.clone();
        f(&mut next.clauses)?;
        Ok(next)
    }

    pub(crate) fn with_result_type(mut self, result_type: SqlType) -> Self {
        self.result_type = result_type;
        self
    }

    pub(crate) fn require(&self, allowed: &[StatementKind], operation: &'static str) -> SqlResult<()> {
        if allowed.contains(&self.kind) {
            Ok(())
        } else {
            Err(SqlError::unsupported(self.kind, operation))
        }
    }

    fn require_select(&self, operation: &'static str) -> SqlResult<()> {
        self.require(&[StatementKind::Select], operation)
    }

    // ==================== dynamic clause mutators ====================

    /// Replace the WHERE condition. Not available on INSERT.
    pub fn filter(&self, condition: impl IntoExpr<bool>) -> SqlResult<Self> {
        self.require(
            &[StatementKind::Select, StatementKind::Update, StatementKind::Delete],
            "WHERE",
        )?;
        let condition = condition.into_expr().into_any();
        Ok(self.with(|c| c.filter = Some(condition)))
    }

    /// AND `condition` onto the existing WHERE condition. Not available on INSERT.
    pub fn and_filter(&self, condition: impl IntoExpr<bool>) -> SqlResult<Self> {
        self.require(
            &[StatementKind::Select, StatementKind::Update, StatementKind::Delete],
            "WHERE",
        )?;
        let condition = condition.into_expr().into_any();
        Ok(self.with(|c| c.and_filter(condition)))
    }

    /// Replace the SELECT list. One expression narrows the result type to
    /// its own, several narrow it to a record.
    pub fn project(&self, exprs: impl IntoExprList) -> SqlResult<Self> {
        self.require_select("SELECT list")?;
        let exprs = exprs.into_expr_list();
        let result_type = match exprs.as_slice() {
            [single] => single.sql_type(),
            _ => SqlType::Record,
        };
        Ok(self.with(|c| c.projection = exprs).with_result_type(result_type))
    }

    pub fn join(
        &self,
        kind: JoinKind,
        table: impl Into<Table>,
        on: impl IntoExpr<bool>,
    ) -> SqlResult<Self> {
        self.require_select("JOIN")?;
        let join = Join {
            kind,
            table: table.into(),
            on: on.into_expr().into_any(),
        };
        Ok(self.with(|c| c.joins.push(join)))
    }

    pub fn group_by(&self, exprs: impl IntoExprList) -> SqlResult<Self> {
        self.require_select("GROUP BY")?;
        let exprs = exprs.into_expr_list();
        Ok(self.with(|c| c.group_by.extend(exprs)))
    }

    pub fn having(&self, condition: impl IntoExpr<bool>) -> SqlResult<Self> {
        self.require_select("HAVING")?;
        let condition = condition.into_expr().into_any();
        Ok(self.with(|c| c.having = Some(condition)))
    }

    pub fn order_by(&self, order: impl Into<OrderBy>) -> SqlResult<Self> {
        self.require_select("ORDER BY")?;
        let order = order.into();
        Ok(self.with(|c| c.order_by.push(order)))
    }

    pub fn limit(&self, limit: i64) -> SqlResult<Self> {
        self.require_select("LIMIT")?;
        let limit = non_negative(limit, "LIMIT")?;
        Ok(self.with(|c| c.limit = Some(limit)))
    }

    pub fn offset(&self, offset: i64) -> SqlResult<Self> {
        self.require_select("OFFSET")?;
        let offset = non_negative(offset, "OFFSET")?;
        Ok(self.with(|c| c.offset = Some(offset)))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn check_table(table: &Table) -> SqlResult<()> {
    check_name("table name", table.name())?;
    match table.alias_name() {
        Some(alias) => check_name("table alias", alias),
        None => Ok(()),
    }
}
