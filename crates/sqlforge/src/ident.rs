//! Identifier checks.
//!
//! Names are rendered verbatim, so the only things rejected are names that
//! can never form valid SQL: empty or whitespace-only names and names
//! containing NUL.

use crate::error::{SqlError, SqlResult};
use crate::expr::{AnyExpr, ExprNode};

/// Reject a blank or NUL-containing name. `what` names the offending clause.
pub(crate) fn check_name(what: &str, name: &str) -> SqlResult<()> {
    if name.trim().is_empty() {
        return Err(SqlError::invalid_argument(format!("{what} must not be empty")));
    }
    if name.contains('\0') {
        return Err(SqlError::invalid_argument(format!(
            "{what} cannot contain NUL character"
        )));
    }
    Ok(())
}

/// Walk an expression tree checking every column reference and subquery.
pub(crate) fn check_expr(expr: &AnyExpr) -> SqlResult<()> {
    match expr.node() {
        ExprNode::Column(col) => {
            check_name("table name", &col.table)?;
            check_name("column name", &col.column)?;
            match &col.alias {
                Some(alias) => check_name("column alias", alias),
                None => Ok(()),
            }
        }
        ExprNode::Literal(_) => Ok(()),
        ExprNode::Binary(op) => {
            check_expr(&op.left)?;
            op.right.as_ref().map_or(Ok(()), check_expr)
        }
        ExprNode::Function(call) => {
            check_name("function name", &call.name)?;
            call.args.iter().try_for_each(check_expr)
        }
        ExprNode::Case(case) => {
            for (condition, result) in &case.branches {
                check_expr(condition)?;
                check_expr(result)?;
            }
            case.otherwise.as_ref().map_or(Ok(()), check_expr)
        }
        ExprNode::Subquery(sub) => sub.statement.validate(),
    }
}
