//! Expression tree nodes.

use crate::stmt::Statement;
use crate::value::{SqlType, Value};
use std::fmt;
use std::sync::Arc;

/// SQL operators usable in a [`BinaryOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Operator {
    /// SQL text of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
        }
    }

    /// Postfix operators that take no right operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The closed set of expression variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprNode {
    Column(ColumnRef),
    Literal(Literal),
    Binary(BinaryOp),
    Function(FunctionCall),
    Case(CaseWhen),
    Subquery(Subquery),
}

impl ExprNode {
    /// Declared result type of this node.
    pub fn sql_type(&self) -> SqlType {
        match self {
            ExprNode::Column(n) => n.ty,
            ExprNode::Literal(n) => n.ty,
            ExprNode::Binary(n) => n.ty,
            ExprNode::Function(n) => n.ty,
            ExprNode::Case(n) => n.ty,
            ExprNode::Subquery(n) => n.ty,
        }
    }

    /// Variant name, as reported by [`SqlError::UnsupportedExpression`](crate::SqlError).
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExprNode::Column(_) => "ColumnRef",
            ExprNode::Literal(_) => "Literal",
            ExprNode::Binary(_) => "BinaryOp",
            ExprNode::Function(_) => "FunctionCall",
            ExprNode::Case(_) => "Conditional",
            ExprNode::Subquery(_) => "Subquery",
        }
    }

    /// `true` for `IS NULL` / `IS NOT NULL` style nodes.
    pub(crate) fn is_unary_op(&self) -> bool {
        matches!(self, ExprNode::Binary(b) if b.right.is_none())
    }
}

/// `table.column[ AS alias]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub(crate) table: String,
    pub(crate) column: String,
    pub(crate) alias: Option<String>,
    pub(crate) ty: SqlType,
}

impl ColumnRef {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// An inline literal. `Value::Null` is the explicit SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub(crate) value: Value,
    pub(crate) ty: SqlType,
}

impl Literal {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryOp {
    pub(crate) left: AnyExpr,
    pub(crate) op: Operator,
    pub(crate) right: Option<AnyExpr>,
    pub(crate) ty: SqlType,
}

impl BinaryOp {
    pub fn left(&self) -> &AnyExpr {
        &self.left
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    /// `None` for unary postfix operators.
    pub fn right(&self) -> Option<&AnyExpr> {
        self.right.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionCall {
    pub(crate) name: String,
    pub(crate) args: Vec<AnyExpr>,
    pub(crate) ty: SqlType,
}

impl FunctionCall {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[AnyExpr] {
        &self.args
    }
}

/// `CASE WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseWhen {
    pub(crate) branches: Vec<(AnyExpr, AnyExpr)>,
    pub(crate) otherwise: Option<AnyExpr>,
    pub(crate) ty: SqlType,
}

impl CaseWhen {
    /// `(condition, result)` pairs in insertion order.
    pub fn branches(&self) -> &[(AnyExpr, AnyExpr)] {
        &self.branches
    }

    pub fn otherwise(&self) -> Option<&AnyExpr> {
        self.otherwise.as_ref()
    }
}

/// A nested SELECT used as an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subquery {
    pub(crate) statement: Box<Statement>,
    pub(crate) ty: SqlType,
}

impl Subquery {
    pub fn statement(&self) -> &Statement {
        &self.statement
    }
}

/// A type-erased, shareable expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyExpr(Arc<ExprNode>);

impl AnyExpr {
    pub(crate) fn new(node: ExprNode) -> Self {
        Self(Arc::new(node))
    }

    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    pub fn sql_type(&self) -> SqlType {
        self.0.sql_type()
    }
}

impl From<ExprNode> for AnyExpr {
    fn from(node: ExprNode) -> Self {
        Self::new(node)
    }
}
