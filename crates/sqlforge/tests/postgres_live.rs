//! Round trip against a live PostgreSQL.
//!
//! Set `DATABASE_URL` (a `.env` file works too); without it these tests skip.

use sqlforge::prelude::*;
use sqlforge::{ExecConfig, InstrumentedExecutor, Record};
use std::time::Duration;

async fn connect() -> SqlResult<Option<tokio_postgres::Client>> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping");
            return Ok(None);
        }
    };
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .map_err(|e| SqlError::Connection(e.to_string()))?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {e}");
        }
    });
    Ok(Some(client))
}

#[tokio::test]
async fn crud_round_trip() -> SqlResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };
    let table = format!("sqlforge_people_{}", std::process::id());
    client
        .batch_execute(&format!(
            "CREATE TEMP TABLE {table} (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL, age INT)"
        ))
        .await?;

    let people = Table::new(table.as_str());
    let name: Expr<String> = people.column("name");
    let age: Expr<i32> = people.column("age");

    let ids = insert_into(&table)
        .columns(["name", "age"])?
        .values(("Alice", 25))?
        .values(("Bob", 30))?
        .values(("Carol", None::<i32>))?
        .returning(["id"])
        .execute_returning(&client)
        .await?;
    assert_eq!(ids.len(), 3);

    let adults = select().from(&people).select(&name).filter(age.ge(18));
    let names: Vec<String> = adults.order_by(&name).fetch_all(&client).await?;
    assert_eq!(names, vec!["Alice".to_string(), "Bob".to_string()]);
    assert_eq!(adults.fetch_count(&client).await?, 2);

    let changed = update(&table)
        .set("age", age.plus(1))?
        .filter(name.eq("Alice"))
        .execute(&client)
        .await?;
    assert_eq!(changed, 1);

    let row: Record = select()
        .from(&people)
        .select_many((&name, &age))
        .filter(name.eq("Alice"))
        .fetch_one(&client)
        .await?;
    let (n, a): (String, i32) = (row.try_get(0)?, row.try_get(1)?);
    assert_eq!((n.as_str(), a), ("Alice", 26));

    let missing = select()
        .from(&people)
        .select(&age)
        .filter(name.eq("Carol"))
        .fetch_one(&client)
        .await;
    assert!(missing.is_err(), "NULL age must not decode into i32");

    let deleted = delete_from(&table).filter(age.is_null()).execute(&client).await?;
    assert_eq!(deleted, 1);
    Ok(())
}

#[tokio::test]
async fn instrumented_timeout() -> SqlResult<()> {
    let Some(client) = connect().await? else {
        return Ok(());
    };
    let exec = InstrumentedExecutor::new(client)
        .with_config(ExecConfig::new().with_query_timeout(Duration::from_millis(50)));
    let slow = select().select(function::<String>("pg_sleep", (lit(1.0),))?);
    let err = slow.fetch_all(&exec).await.unwrap_err();
    assert!(err.is_timeout());
    Ok(())
}
