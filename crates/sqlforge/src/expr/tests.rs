use super::*;
use crate::stmt::select;
use crate::value::Record;
use std::collections::HashSet;

fn age() -> Expr<i32> {
    column("users", "age")
}

fn name() -> Expr<String> {
    column("users", "name")
}

fn email() -> Expr<String> {
    column("users", "email")
}

#[test]
fn column_renders_qualified_name() {
    assert_eq!(name().to_sql(), "users.name");
    assert_eq!(
        column_as::<String>("users", "name", "user_name").to_sql(),
        "users.name AS user_name"
    );
    assert_eq!(Table::new("users").column::<String>("name"), name());
}

#[test]
fn every_node_carries_its_declared_type() {
    assert_eq!(age().sql_type(), SqlType::Int);
    assert_eq!(lit("x".to_string()).sql_type(), SqlType::Text);
    assert_eq!(count(&age()).sql_type(), SqlType::BigInt);
    assert_eq!(avg(&age()).sql_type(), SqlType::Double);
    assert_eq!(age().gt(1).sql_type(), SqlType::Bool);
    assert_eq!(null::<String>().sql_type(), SqlType::Text);
}

#[test]
fn kind_names_match_variants() {
    assert_eq!(age().node().kind_name(), "ColumnRef");
    assert_eq!(lit(1i64).node().kind_name(), "Literal");
    assert_eq!(age().gt(1).node().kind_name(), "BinaryOp");
    assert_eq!(count_all().node().kind_name(), "FunctionCall");
    assert_eq!(
        case_when::<String>(age().lt(18), "Minor").end().node().kind_name(),
        "Conditional"
    );
    let sub = select().from("users").select(age());
    assert_eq!(sub.as_subquery().node().kind_name(), "Subquery");
}

#[test]
fn structurally_equal_trees_are_equal() {
    let a = age().gt(25).and(name().like("%a%"));
    let b = age().gt(25).and(name().like("%a%"));
    assert_eq!(a, b);
    assert_ne!(a, age().gt(26).and(name().like("%a%")));

    let mut set = HashSet::new();
    set.insert(a);
    set.insert(b);
    assert_eq!(set.len(), 1);
}

#[test]
fn unary_null_test_differs_from_null_literal_comparison() {
    let unary = email().is_null();
    let compared = email().eq(None::<String>);
    assert_ne!(unary, compared);
    assert_eq!(unary.to_sql(), "users.email IS NULL");
    assert_eq!(compared.to_sql(), "(users.email = NULL)");
}

#[test]
fn operand_order_is_preserved() {
    let left_first = age().gt(1).and(name().eq("a"));
    let right_first = name().eq("a").and(age().gt(1));
    assert_ne!(left_first, right_first);
    assert_eq!(left_first.to_sql(), "((users.age > 1) AND (users.name = 'a'))");
}

#[test]
fn combinators_leave_operands_untouched() {
    let base = age().ge(18);
    let before = base.to_sql();
    let _wider = base.and(name().like("%John%")).or(email().is_not_null());
    assert_eq!(base.to_sql(), before);
}

#[test]
fn arithmetic_nests_left_to_right() {
    let expr = age().plus(1).times(2);
    assert_eq!(expr.to_sql(), "((users.age + 1) * 2)");
    assert_eq!(expr.sql_type(), SqlType::Int);

    let total: Expr<f64> = column("orders", "amount");
    assert_eq!(total.modulo(2.5).to_sql(), "(orders.amount % 2.5)");
}

#[test]
fn not_wraps_condition() {
    assert_eq!(age().gt(18).not().to_sql(), "NOT((users.age > 18))");
}

#[test]
fn membership_in_subquery() {
    let ids = select()
        .from("orders")
        .select(column::<i32>("orders", "user_id"));
    let id: Expr<i32> = column("users", "id");
    assert_eq!(
        id.in_subquery(&ids).to_sql(),
        "(users.id IN (SELECT orders.user_id FROM orders))"
    );
    assert_eq!(
        id.not_in_subquery(&ids).to_sql(),
        "(users.id NOT IN (SELECT orders.user_id FROM orders))"
    );
}

#[test]
fn bigint_columns_accept_plain_integer_literals() {
    let id: Expr<i64> = column("users", "id");
    assert_eq!(id.eq(1).to_sql(), "(users.id = 1)");
}

#[test]
fn case_builder_collects_branches() {
    let category = case_when::<String>(age().lt(18), "Minor")
        .when(age().lt(65), "Adult")
        .otherwise("Senior");
    assert_eq!(
        category.to_sql(),
        "CASE WHEN (users.age < 18) THEN 'Minor' WHEN (users.age < 65) THEN 'Adult' ELSE 'Senior' END"
    );
}

#[test]
fn function_rejects_blank_name() {
    let err = function::<i64>("  ", (age(),)).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));

    let coalesce = function::<String>("COALESCE", (email(), "n/a")).unwrap();
    assert_eq!(coalesce.to_sql(), "COALESCE(users.email, 'n/a')");
}

#[test]
fn dynamic_like_rejects_non_text_operands() {
    let err = age().into_any().like("%1%").unwrap_err();
    match err {
        SqlError::TypeMismatch {
            operator,
            left,
            right,
        } => {
            assert_eq!(operator, "LIKE");
            assert_eq!(left, SqlType::Int);
            assert_eq!(right, SqlType::Text);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let ok = name().into_any().like("%J%").unwrap();
    assert_eq!(ok.to_sql(), "(users.name LIKE '%J%')");
}

#[test]
fn dynamic_compare_checks_comparability() {
    let err = age().into_any().compare(Operator::Eq, "x").unwrap_err();
    assert!(matches!(err, SqlError::TypeMismatch { operator: "=", .. }));

    let ok = age().into_any().compare(Operator::Eq, 3.5f64).unwrap();
    assert_eq!(ok.to_sql(), "(users.age = 3.5)");

    let err = age().into_any().compare(Operator::Add, 1i32).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
}

#[test]
fn binary_checks_operand_arity() {
    let err = binary(age(), Operator::IsNull, Some(lit(1i32).into_any())).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));

    let err = binary(age(), Operator::Eq, None).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));

    let unary = binary(age(), Operator::IsNotNull, None).unwrap();
    assert_eq!(unary, age().is_not_null().into_any());
}

#[test]
fn binary_types_logical_and_arithmetic_operands() {
    let err = binary(age(), Operator::And, Some(lit(true).into_any())).unwrap_err();
    assert!(matches!(err, SqlError::TypeMismatch { operator: "AND", .. }));

    let big: Expr<i64> = column("users", "score");
    let sum = binary(age(), Operator::Add, Some(big.into_any())).unwrap();
    assert_eq!(sum.sql_type(), SqlType::BigInt);

    let err = binary(name(), Operator::Mul, Some(lit(2i32).into_any())).unwrap_err();
    assert!(matches!(err, SqlError::TypeMismatch { .. }));
}

#[test]
fn downcast_checks_runtime_tag() {
    let any = age().into_any();
    assert_eq!(any.clone().downcast::<i32>().unwrap(), age());
    let err = any.downcast::<String>().unwrap_err();
    assert!(matches!(
        err,
        SqlError::TypeMismatch {
            operator: "CAST",
            left: SqlType::Int,
            right: SqlType::Text,
        }
    ));

    let null = crate::value::Value::Null.into_any_expr();
    assert!(null.downcast::<String>().is_ok());
}

#[test]
fn subquery_type_follows_projection() {
    let names = select().from("users").select(name());
    assert_eq!(subquery(&names).sql_type(), SqlType::Text);
    let rows = select().from("users");
    assert_eq!(subquery::<Record>(&rows).sql_type(), SqlType::Record);
}

#[test]
fn membership_requires_a_subquery_operand() {
    let err = binary(age(), Operator::In, Some(lit(5i32).into_any())).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
    assert!(err.to_string().contains("IN requires a subquery"));

    let err = age().into_any().compare(Operator::NotIn, 5i32).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));

    let err = binary(age(), Operator::In, Some(age().into_any())).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));

    let buyers = select()
        .from("orders")
        .select(column::<i64>("orders", "user_id"));
    let ok = binary(age(), Operator::In, Some(subquery(&buyers).into_any())).unwrap();
    assert_eq!(
        ok.to_sql(),
        "(users.age IN (SELECT orders.user_id FROM orders))"
    );
    let ok = age()
        .into_any()
        .compare(Operator::NotIn, subquery(&buyers))
        .unwrap();
    assert_eq!(
        ok.to_sql(),
        "(users.age NOT IN (SELECT orders.user_id FROM orders))"
    );

    let names = select().from("users").select(name());
    let err = binary(age(), Operator::In, Some(subquery(&names).into_any())).unwrap_err();
    assert!(matches!(err, SqlError::TypeMismatch { operator: "IN", .. }));
}

#[test]
fn checked_table_and_column_constructors_reject_blank_names() {
    assert!(matches!(Table::try_new(""), Err(SqlError::InvalidArgument(_))));
    assert!(matches!(Table::try_new("  "), Err(SqlError::InvalidArgument(_))));

    let users = Table::try_new("users").unwrap();
    assert_eq!(users, Table::new("users"));
    assert_eq!(users.try_column::<i32>("age").unwrap(), age());
    let err = users.try_column::<i32>("").unwrap_err();
    assert!(err.to_string().contains("column name"));
}
