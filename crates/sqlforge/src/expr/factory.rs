//! Expression constructors.

use super::node::{
    AnyExpr, BinaryOp, CaseWhen, ColumnRef, ExprNode, FunctionCall, Literal, Operator, Subquery,
};
use super::{Expr, IntoAnyExpr, IntoExpr, IntoExprList, Numeric};
use crate::error::{SqlError, SqlResult};
use crate::ident::check_name;
use crate::stmt::SelectStmt;
use crate::value::{IntoValue, SqlType, SqlTyped, Value};
use std::marker::PhantomData;

/// A table handle: its name, an optional alias for FROM/JOIN, and a column factory.
///
/// Column references always render with the table name, never the alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Table {
    name: String,
    alias: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Like [`Table::new`], but rejects a blank name with `InvalidArgument`.
    pub fn try_new(name: impl Into<String>) -> SqlResult<Self> {
        let name = name.into();
        check_name("table name", &name)?;
        Ok(Self::new(name))
    }

    /// Copy of this table with `alias` used in FROM/JOIN clauses.
    pub fn alias(&self, alias: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            alias: Some(alias.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Typed reference to column `col` of this table.
    pub fn column<T: SqlTyped>(&self, col: &str) -> Expr<T> {
        column(&self.name, col)
    }

    /// Like [`Table::column`], but rejects a blank column name.
    pub fn try_column<T: SqlTyped>(&self, col: &str) -> SqlResult<Expr<T>> {
        check_name("column name", col)?;
        Ok(self.column(col))
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Table::new(name)
    }
}

impl From<String> for Table {
    fn from(name: String) -> Self {
        Table::new(name)
    }
}

impl From<(&str, &str)> for Table {
    fn from((name, alias): (&str, &str)) -> Self {
        Table::new(name).alias(alias)
    }
}

impl From<&Table> for Table {
    fn from(table: &Table) -> Self {
        table.clone()
    }
}

/// `table.column`
pub fn column<T: SqlTyped>(table: &str, column: &str) -> Expr<T> {
    Expr::from_node(ExprNode::Column(ColumnRef {
        table: table.to_string(),
        column: column.to_string(),
        alias: None,
        ty: T::SQL_TYPE,
    }))
}

/// `table.column AS alias`
pub fn column_as<T: SqlTyped>(table: &str, column: &str, alias: &str) -> Expr<T> {
    Expr::from_node(ExprNode::Column(ColumnRef {
        table: table.to_string(),
        column: column.to_string(),
        alias: Some(alias.to_string()),
        ty: T::SQL_TYPE,
    }))
}

/// Inline literal. `lit(None::<i32>)` is a typed `NULL`.
pub fn lit<T: SqlTyped + IntoValue>(value: T) -> Expr<T> {
    Expr::from_node(ExprNode::Literal(Literal {
        value: value.into_value(),
        ty: T::SQL_TYPE,
    }))
}

/// Explicit SQL `NULL` declared as `T`.
pub fn null<T: SqlTyped>() -> Expr<T> {
    Expr::from_node(ExprNode::Literal(Literal {
        value: Value::Null,
        ty: T::SQL_TYPE,
    }))
}

pub(crate) fn literal_value(value: Value) -> AnyExpr {
    let ty = value.sql_type();
    AnyExpr::new(ExprNode::Literal(Literal { value, ty }))
}

pub(crate) fn call<T: SqlTyped>(name: &str, args: Vec<AnyExpr>) -> Expr<T> {
    Expr::from_node(ExprNode::Function(FunctionCall {
        name: name.to_string(),
        args,
        ty: T::SQL_TYPE,
    }))
}

/// `NAME(arg1, arg2, ...)` declared as returning `T`.
pub fn function<T: SqlTyped>(name: &str, args: impl IntoExprList) -> SqlResult<Expr<T>> {
    check_name("function name", name)?;
    Ok(call(name, args.into_expr_list()))
}

/// `COUNT(expr)`
pub fn count<T>(expr: &Expr<T>) -> Expr<i64> {
    call("COUNT", vec![expr.as_any().clone()])
}

/// `COUNT(1)`, counting every row.
pub fn count_all() -> Expr<i64> {
    call("COUNT", vec![lit(1i32).into_any()])
}

/// `SUM(expr)`
pub fn sum<T: Numeric>(expr: &Expr<T>) -> Expr<T> {
    call("SUM", vec![expr.as_any().clone()])
}

/// `AVG(expr)`, always a double.
pub fn avg<T: Numeric>(expr: &Expr<T>) -> Expr<f64> {
    call("AVG", vec![expr.as_any().clone()])
}

/// `MIN(expr)`
pub fn min<T: SqlTyped>(expr: &Expr<T>) -> Expr<T> {
    call("MIN", vec![expr.as_any().clone()])
}

/// `MAX(expr)`
pub fn max<T: SqlTyped>(expr: &Expr<T>) -> Expr<T> {
    call("MAX", vec![expr.as_any().clone()])
}

/// `(<select>)` as an expression of the select's result type.
pub fn subquery<T: SqlTyped>(select: &SelectStmt<T>) -> Expr<T> {
    Expr::from_node(ExprNode::Subquery(Subquery {
        statement: Box::new(select.statement().clone()),
        ty: T::SQL_TYPE,
    }))
}

/// Start a `CASE WHEN cond THEN result ...` expression.
pub fn case_when<T: SqlTyped>(
    condition: impl IntoExpr<bool>,
    result: impl IntoExpr<T>,
) -> CaseBuilder<T> {
    CaseBuilder {
        branches: Vec::new(),
        _ty: PhantomData,
    }
    .when(condition, result)
}

/// Accumulates CASE branches until `otherwise` or `end`.
#[derive(Debug, Clone)]
pub struct CaseBuilder<T> {
    branches: Vec<(AnyExpr, AnyExpr)>,
    _ty: PhantomData<fn() -> T>,
}

impl<T: SqlTyped> CaseBuilder<T> {
    /// Add another `WHEN cond THEN result` branch.
    pub fn when(mut self, condition: impl IntoExpr<bool>, result: impl IntoExpr<T>) -> Self {
        self.branches
            .push((condition.into_expr().into_any(), result.into_expr().into_any()));
        self
    }

    /// Finish with an `ELSE` branch.
    pub fn otherwise(self, result: impl IntoExpr<T>) -> Expr<T> {
        self.finish(Some(result.into_expr().into_any()))
    }

    /// Finish without `ELSE`.
    pub fn end(self) -> Expr<T> {
        self.finish(None)
    }

    fn finish(self, otherwise: Option<AnyExpr>) -> Expr<T> {
        Expr::from_node(ExprNode::Case(CaseWhen {
            branches: self.branches,
            otherwise,
            ty: T::SQL_TYPE,
        }))
    }
}

/// Build a binary node from untyped operands, validating operand types.
///
/// This is the checked path for expressions assembled at runtime; the typed
/// methods on [`Expr`] enforce the same rules at compile time.
pub fn binary(
    left: impl IntoAnyExpr,
    op: Operator,
    right: Option<AnyExpr>,
) -> SqlResult<AnyExpr> {
    let left = left.into_any_expr();
    let lt = left.sql_type();

    let right = match (op.is_unary(), right) {
        (true, None) => None,
        (true, Some(_)) => {
            return Err(SqlError::invalid_argument(format!(
                "{op} does not take a right operand"
            )));
        }
        (false, None) => {
            return Err(SqlError::invalid_argument(format!(
                "{op} requires a right operand"
            )));
        }
        (false, Some(r)) => Some(r),
    };
    let rt = right.as_ref().map_or(SqlType::Null, AnyExpr::sql_type);
    let mismatch = || SqlError::TypeMismatch {
        operator: op.symbol(),
        left: lt,
        right: rt,
    };
    let nullable = |t: SqlType, pred: fn(SqlType) -> bool| t == SqlType::Null || pred(t);

    let ty = match op {
        _ if op.is_unary() => SqlType::Bool,
        Operator::Like | Operator::NotLike => {
            if !nullable(lt, SqlType::is_textual) || !nullable(rt, SqlType::is_textual) {
                return Err(mismatch());
            }
            SqlType::Bool
        }
        Operator::And | Operator::Or => {
            let boolean = |t: SqlType| t == SqlType::Bool;
            if !nullable(lt, boolean) || !nullable(rt, boolean) {
                return Err(mismatch());
            }
            SqlType::Bool
        }
        Operator::In | Operator::NotIn => {
            if !matches!(right.as_ref().map(AnyExpr::node), Some(ExprNode::Subquery(_))) {
                return Err(SqlError::invalid_argument(format!(
                    "{op} requires a subquery as its right operand"
                )));
            }
            if !lt.is_comparable_with(rt) {
                return Err(mismatch());
            }
            SqlType::Bool
        }
        _ if op.is_arithmetic() => {
            if !nullable(lt, SqlType::is_numeric) || !nullable(rt, SqlType::is_numeric) {
                return Err(mismatch());
            }
            lt.widen(rt)
        }
        _ => {
            if !lt.is_comparable_with(rt) {
                return Err(mismatch());
            }
            SqlType::Bool
        }
    };

    Ok(AnyExpr::new(ExprNode::Binary(BinaryOp {
        left,
        op,
        right,
        ty,
    })))
}
