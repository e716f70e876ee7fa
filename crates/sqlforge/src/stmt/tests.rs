use super::*;
use crate::error::SqlError;
use crate::expr::{Expr, avg, case_when, column, count, count_all, max, min, sum};
use crate::value::SqlType;

struct Users {
    id: Expr<i64>,
    name: Expr<String>,
    age: Expr<i32>,
    email: Expr<String>,
}

fn users() -> Users {
    let t = Table::new("users");
    Users {
        id: t.column("id"),
        name: t.column("name"),
        age: t.column("age"),
        email: t.column("email"),
    }
}

// ==================== SELECT ====================

#[test]
fn test_select_star() {
    assert_eq!(select().from("users").to_sql(), "SELECT * FROM users");
}

#[test]
fn test_select_filter_order_limit() {
    let u = users();
    let q = select()
        .from("users")
        .filter(u.age.gt(25))
        .order_by(&u.name)
        .limit(10)
        .unwrap();
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM users WHERE (users.age > 25) ORDER BY users.name ASC LIMIT 10"
    );
}

#[test]
fn test_select_nested_logic_with_alias() {
    let u = users();
    let q = select()
        .from(Table::new("users").alias("u"))
        .filter(
            u.age
                .ge(18)
                .and(u.name.like("%John%"))
                .or(u.email.is_not_null()),
        )
        .order_by(&u.name)
        .order_by(u.age.desc());
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM users u WHERE (((users.age >= 18) AND (users.name LIKE '%John%')) OR (users.email IS NOT NULL)) ORDER BY users.name ASC, users.age DESC"
    );
}

#[test]
fn test_select_aggregates() {
    let u = users();
    let q = select()
        .select_many((count(&u.age), avg(&u.age), min(&u.age), max(&u.age)))
        .from("users")
        .filter(u.age.gt(0));
    assert_eq!(
        q.to_sql(),
        "SELECT COUNT(users.age), AVG(users.age), MIN(users.age), MAX(users.age) FROM users WHERE (users.age > 0)"
    );
}

#[test]
fn test_select_join_group_having() {
    let u = users();
    let orders = Table::new("orders");
    let user_id: Expr<i64> = orders.column("user_id");
    let amount: Expr<f64> = orders.column("amount");

    let q = select()
        .select_many((&u.name, sum(&amount)))
        .from(("users", "u"))
        .left_join(orders.alias("o"), u.id.eq(&user_id))
        .group_by((&u.id, &u.name))
        .having(sum(&amount).gt(100.0))
        .order_by(sum(&amount).desc());
    assert_eq!(
        q.to_sql(),
        "SELECT users.name, SUM(orders.amount) FROM users u LEFT JOIN orders o ON (users.id = orders.user_id) GROUP BY users.id, users.name HAVING (SUM(orders.amount) > 100.0) ORDER BY SUM(orders.amount) DESC"
    );
}

#[test]
fn test_select_inner_and_right_join() {
    let u = users();
    let user_id: Expr<i64> = column("orders", "user_id");
    let q = select()
        .from("users")
        .inner_join("orders", u.id.eq(&user_id))
        .right_join("payments", u.id.eq(column::<i64>("payments", "user_id")));
    assert_eq!(
        q.to_sql(),
        "SELECT * FROM users INNER JOIN orders ON (users.id = orders.user_id) RIGHT JOIN payments ON (users.id = payments.user_id)"
    );
}

#[test]
fn test_select_case_expression() {
    let u = users();
    let category = case_when::<String>(u.age.lt(18), "Minor")
        .when(u.age.lt(65), "Adult")
        .otherwise("Senior");
    let q = select().select(category).from("users");
    assert_eq!(
        q.to_sql(),
        "SELECT CASE WHEN (users.age < 18) THEN 'Minor' WHEN (users.age < 65) THEN 'Adult' ELSE 'Senior' END FROM users"
    );
    assert_eq!(q.result_type(), SqlType::Text);
}

#[test]
fn test_select_without_from() {
    assert_eq!(select().select(count_all()).to_sql(), "SELECT COUNT(1)");
}

#[test]
fn test_select_narrows_result_type() {
    let u = users();
    let rows = select().from("users");
    assert_eq!(rows.result_type(), SqlType::Record);
    let names: SelectStmt<String> = rows.select(&u.name);
    assert_eq!(names.result_type(), SqlType::Text);
    let typed = select_as::<i64>().from("users").select(count_all());
    assert_eq!(typed.result_type(), SqlType::BigInt);
}

#[test]
fn test_filter_replaces_and_filter_conjoins() {
    let u = users();
    let base = select().from("users").filter(u.age.gt(1));
    assert_eq!(
        base.filter(u.age.lt(9)).to_sql(),
        "SELECT * FROM users WHERE (users.age < 9)"
    );
    assert_eq!(
        base.and_filter(u.age.lt(9)).to_sql(),
        "SELECT * FROM users WHERE ((users.age > 1) AND (users.age < 9))"
    );
    assert_eq!(
        select().from("users").and_filter(u.age.lt(9)).to_sql(),
        "SELECT * FROM users WHERE (users.age < 9)"
    );
}

#[test]
fn test_negative_limit_and_offset_rejected() {
    let q = select().from("users");
    let err = q.limit(-1).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
    assert!(err.to_string().contains("LIMIT must be non-negative"));
    assert!(matches!(q.offset(-5), Err(SqlError::InvalidArgument(_))));
    assert_eq!(q.limit(0).unwrap().to_sql(), "SELECT * FROM users LIMIT 0");
}

#[test]
fn test_paginate() {
    let q = select().from("users").paginate(3, 20).unwrap();
    assert_eq!(q.to_sql(), "SELECT * FROM users LIMIT 20 OFFSET 40");
    assert!(select().from("users").paginate(0, 20).is_err());
    assert!(select().from("users").paginate(1, 0).is_err());
}

#[test]
fn test_builders_never_mutate_receiver() {
    let u = users();
    let base = select().from("users");
    let before = base.clone();
    let _a = base.filter(u.age.gt(18));
    let _b = base.order_by(&u.name).limit(5).unwrap();
    let _c = base.select(&u.name);
    assert_eq!(base, before);
    assert_eq!(base.to_sql(), "SELECT * FROM users");
}

#[test]
fn test_branches_from_shared_base_are_independent() {
    let u = users();
    let base = select().from("users").filter(u.age.gt(18));
    let by_name = base.order_by(&u.name);
    let by_age = base.order_by(u.age.desc());
    assert_ne!(by_name, by_age);
    assert!(by_name.to_sql().ends_with("ORDER BY users.name ASC"));
    assert!(by_age.to_sql().ends_with("ORDER BY users.age DESC"));
}

#[test]
fn test_group_by_appends() {
    let u = users();
    let q = select()
        .from("users")
        .group_by(&u.id)
        .group_by(&u.name);
    assert_eq!(q.to_sql(), "SELECT * FROM users GROUP BY users.id, users.name");
}

#[test]
fn test_select_as_subquery_in_projection() {
    let orders = Table::new("orders");
    let total = select()
        .from(&orders)
        .select(count_all())
        .as_subquery();
    let q = select().select(total);
    assert_eq!(q.to_sql(), "SELECT (SELECT COUNT(1) FROM orders)");
}

// ==================== INSERT ====================

#[test]
fn test_insert_single_row() {
    let q = insert_into("users")
        .columns(["name", "age", "email"])
        .unwrap()
        .values(("Alice", 25, "alice@example.com"))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        "INSERT INTO users (name, age, email) VALUES ('Alice', 25, 'alice@example.com')"
    );
}

#[test]
fn test_insert_multiple_rows() {
    let q = insert_into("users")
        .columns(["name", "age", "email"])
        .unwrap()
        .values(("Alice", 25, "alice@example.com"))
        .unwrap()
        .values(("Bob", 30, "bob@example.com"))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        "INSERT INTO users (name, age, email) VALUES ('Alice', 25, 'alice@example.com'), ('Bob', 30, 'bob@example.com')"
    );
}

#[test]
fn test_insert_arity_mismatch() {
    let q = insert_into("users").columns(["name", "age"]).unwrap();
    let err = q.values(("Alice",)).unwrap_err();
    assert!(matches!(
        err,
        SqlError::ArityMismatch {
            expected: 2,
            found: 1
        }
    ));
    assert_eq!(
        err.to_string(),
        "Number of values (1) must match number of columns (2)"
    );

    let with_row = insert_into("users").values(("Alice", 25)).unwrap();
    assert!(matches!(
        with_row.columns(["name"]),
        Err(SqlError::ArityMismatch { .. })
    ));
}

#[test]
fn test_insert_rejects_empty_columns_and_rows() {
    let empty: [&str; 0] = [];
    assert!(matches!(
        insert_into("users").columns(empty),
        Err(SqlError::InvalidArgument(_))
    ));
    assert!(matches!(
        insert_into("users").columns(["name", " "]),
        Err(SqlError::InvalidArgument(_))
    ));
    assert!(matches!(
        insert_into("users").values(()),
        Err(SqlError::InvalidArgument(_))
    ));
}

#[test]
fn test_insert_without_columns_or_values() {
    assert_eq!(insert_into("users").to_sql(), "INSERT INTO users");
}

#[test]
fn test_insert_from_select_replaces_rows() {
    let u = users();
    let source = select()
        .select_many((&u.name, &u.age))
        .from("users")
        .filter(u.age.gt(65));
    let q = insert_into("archive")
        .columns(["name", "age"])
        .unwrap()
        .values(("X", 1))
        .unwrap()
        .from_select(&source);
    assert_eq!(
        q.to_sql(),
        "INSERT INTO archive (name, age) SELECT users.name, users.age FROM users WHERE (users.age > 65)"
    );
    assert!(q.statement().clauses().rows().is_empty());

    let back = q.values(("Y", 2)).unwrap();
    assert!(back.statement().clauses().source().is_none());
    assert_eq!(
        back.to_sql(),
        "INSERT INTO archive (name, age) VALUES ('Y', 2)"
    );
}

#[test]
fn test_insert_returning() {
    let q = insert_into("users")
        .columns(["name"])
        .unwrap()
        .values(("Alice",))
        .unwrap()
        .returning(["id"]);
    assert_eq!(
        q.to_sql(),
        "INSERT INTO users (name) VALUES ('Alice') RETURNING id"
    );
}

#[test]
fn test_insert_null_and_expression_values() {
    let q = insert_into("users")
        .columns(["name", "email", "age"])
        .unwrap()
        .values(("Carol", None::<String>, users().age.plus(1)))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        "INSERT INTO users (name, email, age) VALUES ('Carol', NULL, (users.age + 1))"
    );
}

// ==================== UPDATE ====================

#[test]
fn test_update_set_and_where() {
    let u = users();
    let q = update("users")
        .set("name", "Updated Name")
        .unwrap()
        .set("age", 26)
        .unwrap()
        .filter(u.id.eq(1));
    assert_eq!(
        q.to_sql(),
        "UPDATE users SET name = 'Updated Name', age = 26 WHERE (users.id = 1)"
    );
}

#[test]
fn test_update_set_overwrites_in_place() {
    let q = update("users")
        .set("name", "X")
        .unwrap()
        .set("age", 1)
        .unwrap()
        .set("name", "Y")
        .unwrap();
    assert_eq!(q.to_sql(), "UPDATE users SET name = 'Y', age = 1");
}

#[test]
fn test_update_empty_set_renders_but_fails_validation() {
    let q = update("users");
    assert_eq!(q.to_sql(), "UPDATE users SET ");
    let err = q.validate().unwrap_err();
    assert!(matches!(err, SqlError::InvalidState(_)));
    assert!(err.to_string().contains("no SET assignments"));
    assert!(q.set("a", 1).unwrap().validate().is_ok());
}

#[test]
fn test_update_returning() {
    let u = users();
    let q = update("users")
        .set("age", u.age.plus(1))
        .unwrap()
        .filter(u.id.eq(7))
        .returning(["id", "age"]);
    assert_eq!(
        q.to_sql(),
        "UPDATE users SET age = (users.age + 1) WHERE (users.id = 7) RETURNING id, age"
    );
}

// ==================== DELETE ====================

#[test]
fn test_delete_with_where() {
    let u = users();
    let q = delete_from("users").filter(u.age.lt(18));
    assert_eq!(q.to_sql(), "DELETE FROM users WHERE (users.age < 18)");
}

#[test]
fn test_delete_without_where() {
    assert_eq!(delete_from("temp_table").to_sql(), "DELETE FROM temp_table");
}

#[test]
fn test_delete_and_filter() {
    let u = users();
    let q = delete_from("users")
        .filter(u.age.lt(18))
        .and_filter(u.email.is_null())
        .returning(["id"]);
    assert_eq!(
        q.to_sql(),
        "DELETE FROM users WHERE ((users.age < 18) AND (users.email IS NULL)) RETURNING id"
    );
}

// ==================== kind-erased statements ====================

#[test]
fn test_dynamic_order_by_unsupported_on_mutations() {
    let u = users();
    let statements: [Statement; 3] = [
        delete_from("users").into(),
        update("users").set("a", 1).unwrap().into(),
        insert_into("users").into(),
    ];
    for stmt in statements {
        let kind = stmt.kind();
        let err = stmt.order_by(&u.name).unwrap_err();
        match err {
            SqlError::UnsupportedOperation {
                kind: found,
                operation,
            } => {
                assert_eq!(found, kind);
                assert_eq!(operation, "ORDER BY");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn test_dynamic_select_only_clauses() {
    let u = users();
    let delete: Statement = delete_from("users").into();
    assert!(matches!(
        delete.limit(1),
        Err(SqlError::UnsupportedOperation { .. })
    ));
    assert!(matches!(
        delete.group_by(&u.id),
        Err(SqlError::UnsupportedOperation { .. })
    ));
    assert!(matches!(
        delete.join(JoinKind::Inner, "orders", u.id.eq(1)),
        Err(SqlError::UnsupportedOperation { .. })
    ));

    let insert: Statement = insert_into("users").into();
    let err = insert.filter(u.age.gt(1)).unwrap_err();
    assert_eq!(err.to_string(), "WHERE is not supported on INSERT statements");

    let filtered = delete.filter(u.age.gt(1)).unwrap();
    assert_eq!(filtered.to_sql(), "DELETE FROM users WHERE (users.age > 1)");
}

#[test]
fn test_dynamic_select_mutators() {
    let u = users();
    let stmt: Statement = select().from("users").into();
    let stmt = stmt
        .project(&u.name)
        .unwrap()
        .order_by(u.name.desc())
        .unwrap()
        .limit(3)
        .unwrap()
        .offset(6)
        .unwrap();
    assert_eq!(stmt.result_type(), SqlType::Text);
    assert_eq!(
        stmt.to_sql(),
        "SELECT users.name FROM users ORDER BY users.name DESC LIMIT 3 OFFSET 6"
    );
    assert!(matches!(
        stmt.limit(-1),
        Err(SqlError::InvalidArgument(_))
    ));

    let wide = stmt.project((&u.name, &u.age)).unwrap();
    assert_eq!(wide.result_type(), SqlType::Record);
}

#[test]
fn test_statement_kind_and_display() {
    let q = delete_from("users");
    assert_eq!(SqlStatement::kind(&q), StatementKind::Delete);
    assert_eq!(q.to_string(), "DELETE FROM users");
    assert_eq!(StatementKind::Update.to_string(), "UPDATE");
}

#[test]
fn test_equal_statements_hash_equally() {
    use std::collections::HashSet;
    let u = users();
    let a: Statement = select().from("users").filter(u.age.gt(1)).into();
    let b: Statement = select().from("users").filter(u.age.gt(1)).into();
    let mut set = HashSet::new();
    set.insert(a);
    set.insert(b);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_dynamic_and_filter_conjoins() {
    let u = users();
    let stmt: Statement = update("users").set("age", 1).unwrap().into();
    let stmt = stmt
        .and_filter(u.age.gt(1))
        .unwrap()
        .and_filter(u.email.is_not_null())
        .unwrap();
    assert_eq!(
        stmt.to_sql(),
        "UPDATE users SET age = 1 WHERE ((users.age > 1) AND (users.email IS NOT NULL))"
    );

    let insert: Statement = insert_into("users").into();
    let err = insert.and_filter(u.age.gt(1)).unwrap_err();
    assert_eq!(err.to_string(), "WHERE is not supported on INSERT statements");
}

// ==================== name checks ====================

#[test]
fn test_update_set_rejects_blank_column() {
    let err = update("users").set("", 1).unwrap_err();
    assert!(matches!(err, SqlError::InvalidArgument(_)));
    assert!(err.to_string().contains("SET column name"));
    assert!(update("users").set("  ", 1).is_err());
}

#[test]
fn test_blank_target_tables_fail_validation() {
    let statements: [Statement; 4] = [
        insert_into("").into(),
        update(" ").set("a", 1).unwrap().into(),
        delete_from("").into(),
        select().from("").into(),
    ];
    for stmt in statements {
        let err = stmt.validate().unwrap_err();
        assert!(matches!(err, SqlError::InvalidArgument(_)), "{stmt}");
        assert!(err.to_string().contains("table name"), "{stmt}");
    }
}

#[test]
fn test_blank_names_inside_clauses_fail_validation() {
    let u = users();
    let blank: Expr<i32> = column("", "");

    let projected = select().from("users").select(&blank);
    assert_eq!(projected.to_sql(), "SELECT . FROM users");
    assert!(matches!(
        projected.validate(),
        Err(SqlError::InvalidArgument(_))
    ));

    let joined = select()
        .from("users")
        .inner_join(("orders", ""), u.id.eq(1));
    let err = joined.validate().unwrap_err();
    assert!(err.to_string().contains("table alias"));

    let filtered = delete_from("users").filter(u.age.gt(1).and(blank.eq(2)));
    assert!(filtered.validate().is_err());

    let returning = delete_from("users").returning([""]);
    let err = returning.validate().unwrap_err();
    assert!(err.to_string().contains("RETURNING column name"));

    let inner = select().from("").select(u.id.clone());
    let outer = select().from("users").filter(u.id.in_subquery(&inner));
    assert!(outer.validate().is_err());

    let ok = select()
        .from("users")
        .filter(u.id.in_subquery(&select().from("orders").select(u.id.clone())));
    assert!(ok.validate().is_ok());
}
