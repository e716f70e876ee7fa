use super::Statement;
use crate::error::{SqlError, SqlResult};
use crate::expr::{AnyExpr, BinaryOp, Expr, ExprNode, Operator, Table};
use crate::ident::check_name;
use crate::value::SqlType;

/// JOIN flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) table: Table,
    pub(crate) on: AnyExpr,
}

impl Join {
    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn on(&self) -> &AnyExpr {
        &self.on
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One ORDER BY item.
///
/// Expressions convert into ascending items, so `order_by(&name)` and
/// `order_by(age.desc())` both work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub(crate) expr: AnyExpr,
    pub(crate) direction: Direction,
}

impl OrderBy {
    pub fn new(expr: AnyExpr, direction: Direction) -> Self {
        Self { expr, direction }
    }

    pub fn expr(&self) -> &AnyExpr {
        &self.expr
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl<T> From<Expr<T>> for OrderBy {
    fn from(expr: Expr<T>) -> Self {
        OrderBy::new(expr.into_any(), Direction::Asc)
    }
}

impl<T> From<&Expr<T>> for OrderBy {
    fn from(expr: &Expr<T>) -> Self {
        OrderBy::new(expr.as_any().clone(), Direction::Asc)
    }
}

impl From<AnyExpr> for OrderBy {
    fn from(expr: AnyExpr) -> Self {
        OrderBy::new(expr, Direction::Asc)
    }
}

/// Clause storage shared by every statement kind.
///
/// Which clauses are populated depends on the kind: SELECT uses the
/// projection through offset, INSERT uses columns/rows/source, UPDATE uses
/// assignments and DELETE only the target and filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClauseBag {
    pub(crate) table: Option<Table>,
    pub(crate) projection: Vec<AnyExpr>,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<AnyExpr>,
    pub(crate) group_by: Vec<AnyExpr>,
    pub(crate) having: Option<AnyExpr>,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) columns: Option<Vec<String>>,
    pub(crate) rows: Vec<Vec<AnyExpr>>,
    pub(crate) source: Option<Box<Statement>>,
    pub(crate) assignments: Vec<(String, AnyExpr)>,
    pub(crate) returning: Vec<String>,
}

impl ClauseBag {
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// SELECT list; empty renders `*`.
    pub fn projection(&self) -> &[AnyExpr] {
        &self.projection
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn filter(&self) -> Option<&AnyExpr> {
        self.filter.as_ref()
    }

    pub fn group_by(&self) -> &[AnyExpr] {
        &self.group_by
    }

    pub fn having(&self) -> Option<&AnyExpr> {
        self.having.as_ref()
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// INSERT column list.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// INSERT value rows.
    pub fn rows(&self) -> &[Vec<AnyExpr>] {
        &self.rows
    }

    /// INSERT ... SELECT source.
    pub fn source(&self) -> Option<&Statement> {
        self.source.as_deref()
    }

    /// UPDATE assignments in insertion order.
    pub fn assignments(&self) -> &[(String, AnyExpr)] {
        &self.assignments
    }

    pub fn returning(&self) -> &[String] {
        &self.returning
    }

    // ==================== shared mutators ====================

    pub(crate) fn and_filter(&mut self, condition: AnyExpr) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => AnyExpr::new(ExprNode::Binary(BinaryOp {
                left: existing,
                op: Operator::And,
                right: Some(condition),
                ty: SqlType::Bool,
            })),
            None => condition,
        });
    }

    pub(crate) fn set_columns(&mut self, columns: Vec<String>) -> SqlResult<()> {
        if columns.is_empty() {
            return Err(SqlError::invalid_argument("column list must not be empty"));
        }
        for column in &columns {
            check_name("INSERT column name", column)?;
        }
        for row in &self.rows {
            check_arity(columns.len(), row.len())?;
        }
        self.columns = Some(columns);
        Ok(())
    }

    pub(crate) fn push_row(&mut self, row: Vec<AnyExpr>) -> SqlResult<()> {
        if row.is_empty() {
            return Err(SqlError::invalid_argument("value row must not be empty"));
        }
        if let Some(columns) = &self.columns {
            check_arity(columns.len(), row.len())?;
        }
        self.source = None;
        self.rows.push(row);
        Ok(())
    }

    pub(crate) fn set_source(&mut self, source: Statement) {
        self.rows.clear();
        self.source = Some(Box::new(source));
    }

    /// Set `column = value`, overwriting an existing assignment in place.
    pub(crate) fn assign(&mut self, column: &str, value: AnyExpr) {
        match self.assignments.iter_mut().find(|(c, _)| c == column) {
            Some((_, slot)) => *slot = value,
            None => self.assignments.push((column.to_string(), value)),
        }
    }

    pub(crate) fn set_returning(&mut self, columns: Vec<String>) {
        self.returning = columns;
    }
}

fn check_arity(expected: usize, found: usize) -> SqlResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SqlError::ArityMismatch { expected, found })
    }
}

/// Convert a signed row count, rejecting negatives.
pub(crate) fn non_negative(value: i64, clause: &str) -> SqlResult<u64> {
    u64::try_from(value)
        .map_err(|_| SqlError::invalid_argument(format!("{clause} must be non-negative, got {value}")))
}
