//! # sqlforge
//!
//! A type-safe SQL statement builder.
//!
//! ## Features
//!
//! - **Typed expressions**: `Expr<T>` carries the result type of every column,
//!   literal, operator and function, so `age.eq("x")` does not compile
//! - **Immutable builders**: every SELECT/INSERT/UPDATE/DELETE method returns a
//!   new statement; a base query can be shared and extended freely
//! - **Deterministic rendering**: the same statement always renders the same
//!   SQL text, byte for byte
//! - **Pluggable execution**: implement [`Executor`] for any backend;
//!   tokio-postgres clients, transactions and deadpool pools work out of the box
//! - **Instrumentation**: [`InstrumentedExecutor`] adds statement timeouts and
//!   `tracing` events (target `sqlforge.sql`)
//!
//! ## Example
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let users = Table::new("users");
//! let age = users.column::<i32>("age");
//! let name = users.column::<String>("name");
//!
//! let adults = select()
//!     .from(&users)
//!     .select(&name)
//!     .filter(age.ge(18))
//!     .order_by(name.asc())
//!     .limit(10)?;
//!
//! assert_eq!(
//!     adults.to_sql(),
//!     "SELECT users.name FROM users WHERE (users.age >= 18) ORDER BY users.name ASC LIMIT 10"
//! );
//!
//! let names: Vec<String> = adults.fetch_all(&client).await?;
//!
//! update("users")
//!     .set("name", "Updated Name")?
//!     .filter(users.column::<i64>("id").eq(1))
//!     .execute(&client)
//!     .await?;
//! ```
//!
//! Literals are rendered inline with single quotes doubled; there are no bind
//! parameters.

pub mod error;
pub mod exec;
pub mod expr;
mod ident;
pub mod prelude;
pub mod render;
pub mod stmt;
pub mod value;

pub use error::{SqlError, SqlResult};
pub use exec::{ExecConfig, Executor, InstrumentedExecutor};
pub use expr::{AnyExpr, Expr, IntoAnyExpr, IntoExpr, IntoExprList, Operator, Table};
pub use render::{ExprVisitor, SqlRenderer};
pub use stmt::{
    DeleteStmt, Direction, InsertStmt, JoinKind, Mutation, OrderBy, SelectStmt, SqlStatement,
    Statement, StatementKind, UpdateStmt, delete_from, insert_into, insert_into_as, select,
    select_as, update,
};
pub use value::{FromRecord, FromValue, IntoValue, Record, SqlType, SqlTyped, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
