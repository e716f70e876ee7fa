//! SQL rendering.
//!
//! [`SqlRenderer`] turns expression trees and statements into SQL text with
//! literals inlined. Output is fully deterministic: the same tree always
//! renders to the same bytes, and structurally equal trees render equally.
//!
//! Rendering rules:
//!
//! | Node | SQL |
//! |------|-----|
//! | column | `table.column[ AS alias]` |
//! | literal | `NULL`, `'quoted ''text'''`, `'2024-01-02'`, `42`, `100.0`, `true` |
//! | binary | `(<left> <op> <right>)` |
//! | unary postfix | `<left> IS NULL`, parenthesized when it is an operand |
//! | function | `NAME(a, b)` |
//! | case | `CASE WHEN c THEN r [...] [ELSE e] END` |
//! | subquery | `(<select>)` |
//!
//! [`ExprVisitor`] exposes the same per-variant traversal for other consumers.

use crate::error::{SqlError, SqlResult};
use crate::expr::{AnyExpr, BinaryOp, CaseWhen, ColumnRef, ExprNode, FunctionCall, Literal, Subquery};
use crate::stmt::{ClauseBag, Statement, StatementKind};
use crate::value::Value;
use chrono::SecondsFormat;

/// Double-dispatch traversal over the six expression variants.
///
/// `C` is an opaque per-traversal context threaded through every visit.
/// Visitors that only understand a subset of the tree may leave the
/// function/case/subquery methods at their defaults, which report
/// [`SqlError::UnsupportedExpression`] naming the variant.
pub trait ExprVisitor<C> {
    type Output;

    fn visit_column(&mut self, node: &ColumnRef, ctx: &mut C) -> SqlResult<Self::Output>;

    fn visit_literal(&mut self, node: &Literal, ctx: &mut C) -> SqlResult<Self::Output>;

    fn visit_binary(&mut self, node: &BinaryOp, ctx: &mut C) -> SqlResult<Self::Output>;

    fn visit_function(&mut self, node: &FunctionCall, ctx: &mut C) -> SqlResult<Self::Output> {
        let _ = (node, ctx);
        Err(SqlError::UnsupportedExpression("FunctionCall"))
    }

    fn visit_case(&mut self, node: &CaseWhen, ctx: &mut C) -> SqlResult<Self::Output> {
        let _ = (node, ctx);
        Err(SqlError::UnsupportedExpression("Conditional"))
    }

    fn visit_subquery(&mut self, node: &Subquery, ctx: &mut C) -> SqlResult<Self::Output> {
        let _ = (node, ctx);
        Err(SqlError::UnsupportedExpression("Subquery"))
    }
}

impl AnyExpr {
    /// Dispatch to the visit method matching this node's variant.
    pub fn accept<C, V>(&self, visitor: &mut V, ctx: &mut C) -> SqlResult<V::Output>
    where
        V: ExprVisitor<C> + ?Sized,
    {
        match self.node() {
            ExprNode::Column(n) => visitor.visit_column(n, ctx),
            ExprNode::Literal(n) => visitor.visit_literal(n, ctx),
            ExprNode::Binary(n) => visitor.visit_binary(n, ctx),
            ExprNode::Function(n) => visitor.visit_function(n, ctx),
            ExprNode::Case(n) => visitor.visit_case(n, ctx),
            ExprNode::Subquery(n) => visitor.visit_subquery(n, ctx),
        }
    }
}

/// Renders literal-inlined SQL text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlRenderer {
    _private: (),
}

impl SqlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a single expression.
    pub fn expr(&self, expr: &AnyExpr) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, expr);
        out
    }

    /// Render a full statement.
    pub fn statement(&self, stmt: &Statement) -> String {
        let mut out = String::with_capacity(64);
        self.write_statement(&mut out, stmt);
        out
    }

    fn write_expr(&self, out: &mut String, expr: &AnyExpr) {
        match expr.node() {
            ExprNode::Column(n) => self.write_column(out, n),
            ExprNode::Literal(n) => out.push_str(&literal(&n.value)),
            ExprNode::Binary(n) => self.write_binary(out, n),
            ExprNode::Function(n) => self.write_function(out, n),
            ExprNode::Case(n) => self.write_case(out, n),
            ExprNode::Subquery(n) => {
                out.push('(');
                self.write_statement(out, &n.statement);
                out.push(')');
            }
        }
    }

    fn write_column(&self, out: &mut String, col: &ColumnRef) {
        out.push_str(&col.table);
        out.push('.');
        out.push_str(&col.column);
        if let Some(alias) = &col.alias {
            out.push_str(" AS ");
            out.push_str(alias);
        }
    }

    fn write_binary(&self, out: &mut String, op: &BinaryOp) {
        match &op.right {
            None => {
                self.write_expr(out, &op.left);
                out.push(' ');
                out.push_str(op.op.symbol());
            }
            Some(right) => {
                out.push('(');
                self.write_operand(out, &op.left);
                out.push(' ');
                out.push_str(op.op.symbol());
                out.push(' ');
                self.write_operand(out, right);
                out.push(')');
            }
        }
    }

    // Unary postfix nodes get their own parentheses when nested in a binary op.
    fn write_operand(&self, out: &mut String, expr: &AnyExpr) {
        if expr.node().is_unary_op() {
            out.push('(');
            self.write_expr(out, expr);
            out.push(')');
        } else {
            self.write_expr(out, expr);
        }
    }

    fn write_function(&self, out: &mut String, call: &FunctionCall) {
        out.push_str(&call.name);
        out.push('(');
        self.write_list(out, &call.args);
        out.push(')');
    }

    fn write_case(&self, out: &mut String, case: &CaseWhen) {
        out.push_str("CASE");
        for (condition, result) in &case.branches {
            out.push_str(" WHEN ");
            self.write_expr(out, condition);
            out.push_str(" THEN ");
            self.write_expr(out, result);
        }
        if let Some(otherwise) = &case.otherwise {
            out.push_str(" ELSE ");
            self.write_expr(out, otherwise);
        }
        out.push_str(" END");
    }

    fn write_list(&self, out: &mut String, items: &[AnyExpr]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr(out, item);
        }
    }

    fn write_statement(&self, out: &mut String, stmt: &Statement) {
        let clauses = stmt.clauses();
        match stmt.kind() {
            StatementKind::Select => self.write_select(out, clauses),
            StatementKind::Insert => self.write_insert(out, clauses),
            StatementKind::Update => self.write_update(out, clauses),
            StatementKind::Delete => self.write_delete(out, clauses),
        }
    }

    fn write_select(&self, out: &mut String, c: &ClauseBag) {
        out.push_str("SELECT ");
        if c.projection.is_empty() {
            out.push('*');
        } else {
            self.write_list(out, &c.projection);
        }

        if let Some(table) = &c.table {
            out.push_str(" FROM ");
            out.push_str(table.name());
            if let Some(alias) = table.alias_name() {
                out.push(' ');
                out.push_str(alias);
            }
        }

        for join in &c.joins {
            out.push(' ');
            out.push_str(join.kind.keyword());
            out.push(' ');
            out.push_str(join.table.name());
            if let Some(alias) = join.table.alias_name() {
                out.push(' ');
                out.push_str(alias);
            }
            out.push_str(" ON ");
            self.write_expr(out, &join.on);
        }

        self.write_where(out, c);

        if !c.group_by.is_empty() {
            out.push_str(" GROUP BY ");
            self.write_list(out, &c.group_by);
        }

        if let Some(having) = &c.having {
            out.push_str(" HAVING ");
            self.write_expr(out, having);
        }

        if !c.order_by.is_empty() {
            out.push_str(" ORDER BY ");
            for (i, order) in c.order_by.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.write_expr(out, &order.expr);
                out.push(' ');
                out.push_str(order.direction.keyword());
            }
        }

        if let Some(limit) = c.limit {
            out.push_str(" LIMIT ");
            out.push_str(&limit.to_string());
        }

        if let Some(offset) = c.offset {
            out.push_str(" OFFSET ");
            out.push_str(&offset.to_string());
        }
    }

    fn write_insert(&self, out: &mut String, c: &ClauseBag) {
        out.push_str("INSERT INTO ");
        self.write_target(out, c);

        if let Some(columns) = &c.columns {
            out.push_str(" (");
            out.push_str(&columns.join(", "));
            out.push(')');
        }

        if !c.rows.is_empty() {
            out.push_str(" VALUES ");
            for (i, row) in c.rows.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push('(');
                self.write_list(out, row);
                out.push(')');
            }
        } else if let Some(source) = &c.source {
            out.push(' ');
            self.write_statement(out, source);
        }

        self.write_returning(out, c);
    }

    fn write_update(&self, out: &mut String, c: &ClauseBag) {
        out.push_str("UPDATE ");
        self.write_target(out, c);
        out.push_str(" SET ");
        for (i, (column, value)) in c.assignments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(column);
            out.push_str(" = ");
            self.write_expr(out, value);
        }
        self.write_where(out, c);
        self.write_returning(out, c);
    }

    fn write_delete(&self, out: &mut String, c: &ClauseBag) {
        out.push_str("DELETE FROM ");
        self.write_target(out, c);
        self.write_where(out, c);
        self.write_returning(out, c);
    }

    fn write_target(&self, out: &mut String, c: &ClauseBag) {
        if let Some(table) = &c.table {
            out.push_str(table.name());
        }
    }

    fn write_where(&self, out: &mut String, c: &ClauseBag) {
        if let Some(filter) = &c.filter {
            out.push_str(" WHERE ");
            self.write_expr(out, filter);
        }
    }

    fn write_returning(&self, out: &mut String, c: &ClauseBag) {
        if !c.returning.is_empty() {
            out.push_str(" RETURNING ");
            out.push_str(&c.returning.join(", "));
        }
    }
}

impl ExprVisitor<()> for SqlRenderer {
    type Output = String;

    fn visit_column(&mut self, node: &ColumnRef, _: &mut ()) -> SqlResult<String> {
        let mut out = String::new();
        self.write_column(&mut out, node);
        Ok(out)
    }

    fn visit_literal(&mut self, node: &Literal, _: &mut ()) -> SqlResult<String> {
        Ok(literal(&node.value))
    }

    fn visit_binary(&mut self, node: &BinaryOp, _: &mut ()) -> SqlResult<String> {
        let mut out = String::new();
        self.write_binary(&mut out, node);
        Ok(out)
    }

    fn visit_function(&mut self, node: &FunctionCall, _: &mut ()) -> SqlResult<String> {
        let mut out = String::new();
        self.write_function(&mut out, node);
        Ok(out)
    }

    fn visit_case(&mut self, node: &CaseWhen, _: &mut ()) -> SqlResult<String> {
        let mut out = String::new();
        self.write_case(&mut out, node);
        Ok(out)
    }

    fn visit_subquery(&mut self, node: &Subquery, _: &mut ()) -> SqlResult<String> {
        Ok(format!("({})", self.statement(&node.statement)))
    }
}

/// Inline SQL text for a literal value.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::SmallInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::Double(v) if v.is_finite() => format!("{v:?}"),
        Value::Double(v) if v.is_nan() => quote("NaN"),
        Value::Double(v) if *v > 0.0 => quote("Infinity"),
        Value::Double(_) => quote("-Infinity"),
        #[cfg(feature = "rust_decimal")]
        Value::Decimal(v) => v.to_string(),
        Value::Text(v) => quote(v),
        Value::Date(v) => quote(&v.format("%Y-%m-%d").to_string()),
        Value::Time(v) => quote(&v.format("%H:%M:%S%.f").to_string()),
        Value::Timestamp(v) => quote(&v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::TimestampTz(v) => quote(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Uuid(v) => quote(&v.to_string()),
        Value::Json(v) => quote(&v.to_string()),
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    out.push_str(&text.replace('\'', "''"));
    out.push('\'');
    out
}
