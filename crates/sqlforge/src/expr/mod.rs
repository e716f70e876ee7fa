//! Typed expression trees.
//!
//! Expressions are immutable values backed by an `Arc`'d [`ExprNode`]. Every
//! combinator returns a new node and leaves its operands untouched, so the
//! same expression can be reused across many statements.
//!
//! # Usage
//!
//! ```ignore
//! use sqlforge::expr::{column, count};
//!
//! let age = column::<i32>("users", "age");
//! let name = column::<String>("users", "name");
//!
//! let adult_johns = age.ge(18).and(name.like("%John%"));
//! assert_eq!(adult_johns.to_sql(), "((users.age >= 18) AND (users.name LIKE '%John%'))");
//! ```

mod convert;
mod factory;
mod node;

pub use convert::{IntoAnyExpr, IntoExpr, IntoExprList};
pub use factory::{
    CaseBuilder, Table, avg, binary, case_when, column, column_as, count, count_all, function,
    lit, max, min, null, subquery, sum,
};
pub use node::{
    AnyExpr, BinaryOp, CaseWhen, ColumnRef, ExprNode, FunctionCall, Literal, Operator, Subquery,
};

use crate::error::{SqlError, SqlResult};
use crate::stmt::{Direction, OrderBy, SelectStmt};
use crate::value::{SqlType, SqlTyped};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker for types that support arithmetic and `SUM`.
pub trait Numeric: SqlTyped {}

impl Numeric for i16 {}
impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for f64 {}
#[cfg(feature = "rust_decimal")]
impl Numeric for rust_decimal::Decimal {}

/// An expression whose result type is statically `T`.
pub struct Expr<T> {
    inner: AnyExpr,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _ty: PhantomData,
        }
    }
}

impl<T> PartialEq for Expr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Expr<T> {}

impl<T> Hash for Expr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expr").field(self.inner.node()).finish()
    }
}

impl<T> fmt::Display for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<T> Expr<T> {
    /// Wrap an erased expression without checking its tag.
    pub(crate) fn wrap(inner: AnyExpr) -> Self {
        Self {
            inner,
            _ty: PhantomData,
        }
    }

    pub(crate) fn from_node(node: ExprNode) -> Self {
        Self::wrap(AnyExpr::new(node))
    }

    pub fn node(&self) -> &ExprNode {
        self.inner.node()
    }

    pub fn sql_type(&self) -> SqlType {
        self.inner.sql_type()
    }

    pub fn as_any(&self) -> &AnyExpr {
        &self.inner
    }

    pub fn into_any(self) -> AnyExpr {
        self.inner
    }

    /// Render this expression on its own.
    pub fn to_sql(&self) -> String {
        self.inner.to_sql()
    }

    /// `<self> ASC` for ORDER BY.
    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.inner.clone(), Direction::Asc)
    }

    /// `<self> DESC` for ORDER BY.
    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.inner.clone(), Direction::Desc)
    }

    fn predicate(&self, op: Operator, right: Option<AnyExpr>) -> Expr<bool> {
        Expr::from_node(ExprNode::Binary(BinaryOp {
            left: self.inner.clone(),
            op,
            right,
            ty: SqlType::Bool,
        }))
    }

    /// `<self> IS NULL`
    pub fn is_null(&self) -> Expr<bool> {
        self.predicate(Operator::IsNull, None)
    }

    /// `<self> IS NOT NULL`
    pub fn is_not_null(&self) -> Expr<bool> {
        self.predicate(Operator::IsNotNull, None)
    }
}

impl<T: SqlTyped> Expr<T> {
    fn compare(&self, op: Operator, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.predicate(op, Some(rhs.into_expr().into_any()))
    }

    /// `(<self> = <rhs>)`
    pub fn eq(&self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.compare(Operator::Eq, rhs)
    }

    /// `(<self> != <rhs>)`
    pub fn ne(&self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.compare(Operator::Ne, rhs)
    }

    pub fn lt(&self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.compare(Operator::Lt, rhs)
    }

    pub fn le(&self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.compare(Operator::Le, rhs)
    }

    pub fn gt(&self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.compare(Operator::Gt, rhs)
    }

    pub fn ge(&self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        self.compare(Operator::Ge, rhs)
    }

    /// `(<self> IN (<select>))`
    pub fn in_subquery(&self, select: &SelectStmt<T>) -> Expr<bool> {
        self.predicate(Operator::In, Some(subquery(select).into_any()))
    }

    /// `(<self> NOT IN (<select>))`
    pub fn not_in_subquery(&self, select: &SelectStmt<T>) -> Expr<bool> {
        self.predicate(Operator::NotIn, Some(subquery(select).into_any()))
    }
}

impl Expr<bool> {
    /// `(<self> AND <rhs>)`; the receiver always becomes the left operand.
    pub fn and(&self, rhs: impl IntoExpr<bool>) -> Expr<bool> {
        self.compare(Operator::And, rhs)
    }

    /// `(<self> OR <rhs>)`
    pub fn or(&self, rhs: impl IntoExpr<bool>) -> Expr<bool> {
        self.compare(Operator::Or, rhs)
    }

    /// `NOT(<self>)`
    pub fn not(&self) -> Expr<bool> {
        factory::call("NOT", vec![self.inner.clone()])
    }
}

impl Expr<String> {
    /// `(<self> LIKE <pattern>)`
    pub fn like(&self, pattern: impl IntoExpr<String>) -> Expr<bool> {
        self.compare(Operator::Like, pattern)
    }

    /// `(<self> NOT LIKE <pattern>)`
    pub fn not_like(&self, pattern: impl IntoExpr<String>) -> Expr<bool> {
        self.compare(Operator::NotLike, pattern)
    }
}

impl<T: Numeric> Expr<T> {
    fn arithmetic(&self, op: Operator, rhs: impl IntoExpr<T>) -> Expr<T> {
        Expr::from_node(ExprNode::Binary(BinaryOp {
            left: self.inner.clone(),
            op,
            right: Some(rhs.into_expr().into_any()),
            ty: T::SQL_TYPE,
        }))
    }

    /// `(<self> + <rhs>)`
    pub fn plus(&self, rhs: impl IntoExpr<T>) -> Expr<T> {
        self.arithmetic(Operator::Add, rhs)
    }

    pub fn minus(&self, rhs: impl IntoExpr<T>) -> Expr<T> {
        self.arithmetic(Operator::Sub, rhs)
    }

    pub fn times(&self, rhs: impl IntoExpr<T>) -> Expr<T> {
        self.arithmetic(Operator::Mul, rhs)
    }

    pub fn divide(&self, rhs: impl IntoExpr<T>) -> Expr<T> {
        self.arithmetic(Operator::Div, rhs)
    }

    pub fn modulo(&self, rhs: impl IntoExpr<T>) -> Expr<T> {
        self.arithmetic(Operator::Mod, rhs)
    }
}

impl AnyExpr {
    /// Render this expression on its own.
    pub fn to_sql(&self) -> String {
        crate::render::SqlRenderer::new().expr(self)
    }

    /// Recover a typed handle, checking the runtime tag.
    ///
    /// `NULL` literals downcast to any type.
    pub fn downcast<T: SqlTyped>(self) -> SqlResult<Expr<T>> {
        let found = self.sql_type();
        if found == T::SQL_TYPE || found == SqlType::Null {
            Ok(Expr::wrap(self))
        } else {
            Err(SqlError::TypeMismatch {
                operator: "CAST",
                left: found,
                right: T::SQL_TYPE,
            })
        }
    }

    /// Checked comparison, membership or pattern predicate.
    pub fn compare(&self, op: Operator, rhs: impl IntoAnyExpr) -> SqlResult<Expr<bool>> {
        if op.is_arithmetic() {
            return Err(SqlError::invalid_argument(format!(
                "{op} is not a predicate operator"
            )));
        }
        binary(self.clone(), op, Some(rhs.into_any_expr())).map(Expr::wrap)
    }

    /// `(<self> LIKE <pattern>)`, rejecting non-text operands.
    pub fn like(&self, pattern: impl IntoAnyExpr) -> SqlResult<Expr<bool>> {
        self.compare(Operator::Like, pattern)
    }

    /// `<self> IS NULL`
    pub fn is_null(&self) -> Expr<bool> {
        Expr::<()>::wrap(self.clone()).is_null()
    }

    /// `<self> IS NOT NULL`
    pub fn is_not_null(&self) -> Expr<bool> {
        Expr::<()>::wrap(self.clone()).is_not_null()
    }
}

impl fmt::Display for AnyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl<T> From<Expr<T>> for AnyExpr {
    fn from(expr: Expr<T>) -> Self {
        expr.into_any()
    }
}

#[cfg(test)]
mod tests;
