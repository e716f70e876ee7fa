//! Convenient imports for typical `sqlforge` usage.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//! ```

pub use crate::{
    Executor, Expr, JoinKind, Record, SqlError, SqlResult, SqlStatement, Table, delete_from,
    insert_into, insert_into_as, select, select_as, update,
};

pub use crate::expr::{
    avg, case_when, column, column_as, count, count_all, function, lit, max, min, null, subquery,
    sum,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
