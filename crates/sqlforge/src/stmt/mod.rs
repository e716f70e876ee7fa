//! Immutable statement builders.
//!
//! Every builder method takes `&self` and returns a new statement; the
//! receiver is never modified. All four statement kinds share one
//! [`ClauseBag`] and differ only in which clauses they expose.
//!
//! # Usage
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let users = Table::new("users");
//! let age = users.column::<i32>("age");
//! let name = users.column::<String>("name");
//!
//! // SELECT
//! let q = select().from(&users).filter(age.gt(25)).order_by(&name).limit(10)?;
//! assert_eq!(q.to_sql(), "SELECT * FROM users WHERE (users.age > 25) ORDER BY users.name ASC LIMIT 10");
//!
//! // INSERT
//! let q = insert_into("users").columns(["name", "age"])?.values(("Alice", 25))?;
//!
//! // UPDATE
//! let q = update("users").set("name", "X")?.filter(users.column::<i64>("id").eq(1));
//!
//! // DELETE
//! let q = delete_from("users");
//! ```

mod clauses;
mod delete;
mod insert;
mod select;
mod statement;
mod update;

pub use clauses::{ClauseBag, Direction, Join, JoinKind, OrderBy};
pub use delete::DeleteStmt;
pub use insert::InsertStmt;
pub use select::SelectStmt;
pub use statement::{Statement, StatementKind};
pub use update::UpdateStmt;

use crate::error::SqlResult;
use crate::expr::Table;
use crate::value::{Record, SqlTyped};

/// Common surface of every statement builder.
pub trait SqlStatement: Send + Sync {
    /// The kind-erased statement value.
    fn statement(&self) -> &Statement;

    /// Render the SQL text.
    fn to_sql(&self) -> String {
        self.statement().to_sql()
    }

    /// Validate the statement before execution.
    fn validate(&self) -> SqlResult<()> {
        self.statement().validate()
    }

    fn kind(&self) -> StatementKind {
        self.statement().kind()
    }
}

/// Statements that modify rows: INSERT, UPDATE and DELETE.
pub trait Mutation: SqlStatement {}

/// Start a SELECT whose rows map to [`Record`].
///
/// # Example
/// ```ignore
/// let q = sqlforge::select().from("users");
/// assert_eq!(q.to_sql(), "SELECT * FROM users");
/// ```
pub fn select() -> SelectStmt<Record> {
    SelectStmt::new()
}

/// Start a SELECT declaring its rows map to `T`.
pub fn select_as<T: SqlTyped>() -> SelectStmt<T> {
    SelectStmt::new()
}

/// Start an INSERT whose generated keys are `i64`.
pub fn insert_into(table: &str) -> InsertStmt<i64> {
    InsertStmt::new(table)
}

/// Start an INSERT whose generated keys are `K`.
pub fn insert_into_as<K: SqlTyped>(table: &str) -> InsertStmt<K> {
    InsertStmt::new(table)
}

/// Start an UPDATE.
pub fn update(table: &str) -> UpdateStmt {
    UpdateStmt::new(table)
}

/// Start a DELETE. Without a filter it deletes every row.
pub fn delete_from(table: &str) -> DeleteStmt {
    DeleteStmt::new(table)
}

pub(crate) fn target(table: &str) -> Option<Table> {
    Some(Table::new(table))
}

#[cfg(test)]
mod tests;
