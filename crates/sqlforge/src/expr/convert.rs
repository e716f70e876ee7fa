//! Conversions from Rust values and typed handles into expressions.

use super::{AnyExpr, Expr, lit};
use crate::value::{SqlTyped, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

/// Anything usable where an `Expr<T>` operand is expected.
///
/// Implemented for typed expressions and for plain Rust values, which become
/// literals: `age.gt(25)`, `name.eq("Bob")`, `email.eq(None::<String>)`.
pub trait IntoExpr<T> {
    fn into_expr(self) -> Expr<T>;
}

/// Anything usable as an untyped operand (select lists, value rows, function args).
pub trait IntoAnyExpr {
    fn into_any_expr(self) -> AnyExpr;
}

/// An ordered list of untyped operands.
///
/// Implemented for tuples of up to 12 heterogeneous operands, for
/// `Vec`/arrays of a single operand type, and for single expressions.
pub trait IntoExprList {
    fn into_expr_list(self) -> Vec<AnyExpr>;
}

impl<T: SqlTyped> IntoExpr<T> for Expr<T> {
    fn into_expr(self) -> Expr<T> {
        self
    }
}

impl<T: SqlTyped> IntoExpr<T> for &Expr<T> {
    fn into_expr(self) -> Expr<T> {
        self.clone()
    }
}

macro_rules! impl_literal_operand {
    ($($ty:ty),* $(,)?) => {$(
        impl IntoExpr<$ty> for $ty {
            fn into_expr(self) -> Expr<$ty> {
                lit(self)
            }
        }

        impl IntoExpr<$ty> for Option<$ty> {
            fn into_expr(self) -> Expr<$ty> {
                Expr::wrap(lit(self).into_any())
            }
        }

        impl IntoAnyExpr for $ty {
            fn into_any_expr(self) -> AnyExpr {
                lit(self).into_any()
            }
        }

        impl IntoAnyExpr for Option<$ty> {
            fn into_any_expr(self) -> AnyExpr {
                lit(self).into_any()
            }
        }
    )*};
}

impl_literal_operand!(
    bool,
    i16,
    i32,
    i64,
    f64,
    String,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<Utc>,
    Uuid,
    serde_json::Value,
);

#[cfg(feature = "rust_decimal")]
impl_literal_operand!(rust_decimal::Decimal);

impl IntoExpr<i64> for i32 {
    fn into_expr(self) -> Expr<i64> {
        lit(i64::from(self))
    }
}

impl IntoExpr<String> for &str {
    fn into_expr(self) -> Expr<String> {
        lit(self.to_string())
    }
}

impl IntoExpr<String> for &String {
    fn into_expr(self) -> Expr<String> {
        lit(self.clone())
    }
}

impl IntoAnyExpr for &str {
    fn into_any_expr(self) -> AnyExpr {
        lit(self.to_string()).into_any()
    }
}

impl IntoAnyExpr for &String {
    fn into_any_expr(self) -> AnyExpr {
        lit(self.clone()).into_any()
    }
}

impl IntoAnyExpr for Value {
    fn into_any_expr(self) -> AnyExpr {
        super::factory::literal_value(self)
    }
}

impl<T> IntoAnyExpr for Expr<T> {
    fn into_any_expr(self) -> AnyExpr {
        self.into_any()
    }
}

impl<T> IntoAnyExpr for &Expr<T> {
    fn into_any_expr(self) -> AnyExpr {
        self.as_any().clone()
    }
}

impl IntoAnyExpr for AnyExpr {
    fn into_any_expr(self) -> AnyExpr {
        self
    }
}

impl IntoAnyExpr for &AnyExpr {
    fn into_any_expr(self) -> AnyExpr {
        self.clone()
    }
}

impl IntoExprList for () {
    fn into_expr_list(self) -> Vec<AnyExpr> {
        Vec::new()
    }
}

impl<E: IntoAnyExpr> IntoExprList for Vec<E> {
    fn into_expr_list(self) -> Vec<AnyExpr> {
        self.into_iter().map(IntoAnyExpr::into_any_expr).collect()
    }
}

impl<E: IntoAnyExpr, const N: usize> IntoExprList for [E; N] {
    fn into_expr_list(self) -> Vec<AnyExpr> {
        self.into_iter().map(IntoAnyExpr::into_any_expr).collect()
    }
}

impl<T> IntoExprList for Expr<T> {
    fn into_expr_list(self) -> Vec<AnyExpr> {
        vec![self.into_any()]
    }
}

impl<T> IntoExprList for &Expr<T> {
    fn into_expr_list(self) -> Vec<AnyExpr> {
        vec![self.as_any().clone()]
    }
}

impl IntoExprList for AnyExpr {
    fn into_expr_list(self) -> Vec<AnyExpr> {
        vec![self]
    }
}

macro_rules! impl_expr_list_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoAnyExpr),+> IntoExprList for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_expr_list(self) -> Vec<AnyExpr> {
                let ($($name,)+) = self;
                vec![$($name.into_any_expr()),+]
            }
        }
    };
}

impl_expr_list_tuple!(A);
impl_expr_list_tuple!(A, B);
impl_expr_list_tuple!(A, B, C);
impl_expr_list_tuple!(A, B, C, D);
impl_expr_list_tuple!(A, B, C, D, E);
impl_expr_list_tuple!(A, B, C, D, E, F);
impl_expr_list_tuple!(A, B, C, D, E, F, G);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);
