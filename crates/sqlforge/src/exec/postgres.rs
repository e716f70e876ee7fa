//! `Executor` for tokio-postgres clients and transactions.

use super::Executor;
use crate::error::{SqlError, SqlResult};
use crate::value::{IntoValue, Record, SqlType, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

type Decoder = fn(&Row, usize) -> SqlResult<Value>;

/// Map a PostgreSQL column type to the [`SqlType`] it decodes into.
///
/// Returns `None` for types without a [`Value`] counterpart (arrays, ranges, ...).
pub fn sql_type_of(ty: &Type) -> Option<SqlType> {
    let sql_type = match *ty {
        Type::BOOL => SqlType::Bool,
        Type::INT2 => SqlType::SmallInt,
        Type::INT4 => SqlType::Int,
        Type::INT8 => SqlType::BigInt,
        Type::FLOAT4 | Type::FLOAT8 => SqlType::Double,
        Type::NUMERIC => SqlType::Decimal,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => SqlType::Text,
        Type::DATE => SqlType::Date,
        Type::TIME => SqlType::Time,
        Type::TIMESTAMP => SqlType::Timestamp,
        Type::TIMESTAMPTZ => SqlType::TimestampTz,
        Type::UUID => SqlType::Uuid,
        Type::JSON | Type::JSONB => SqlType::Json,
        _ => return None,
    };
    Some(sql_type)
}

fn column_label(row: &Row, idx: usize) -> String {
    row.columns()
        .get(idx)
        .map_or_else(|| idx.to_string(), |c| c.name().to_string())
}

fn decode<T>(row: &Row, idx: usize) -> SqlResult<Value>
where
    T: for<'a> FromSql<'a> + IntoValue,
{
    row.try_get::<_, Option<T>>(idx)
        .map(IntoValue::into_value)
        .map_err(|e| SqlError::decode(column_label(row, idx), e.to_string()))
}

fn decode_double(row: &Row, idx: usize) -> SqlResult<Value> {
    match *row.columns()[idx].type_() {
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .map(|v| v.map(f64::from).into_value())
            .map_err(|e| SqlError::decode(column_label(row, idx), e.to_string())),
        _ => decode::<f64>(row, idx),
    }
}

#[cfg(feature = "rust_decimal")]
fn decode_decimal(row: &Row, idx: usize) -> SqlResult<Value> {
    decode::<rust_decimal::Decimal>(row, idx)
}

#[cfg(not(feature = "rust_decimal"))]
fn decode_decimal(row: &Row, idx: usize) -> SqlResult<Value> {
    Err(SqlError::decode(
        column_label(row, idx),
        "NUMERIC columns require the `rust_decimal` feature",
    ))
}

fn decoders() -> &'static HashMap<SqlType, Decoder> {
    static DECODERS: OnceLock<HashMap<SqlType, Decoder>> = OnceLock::new();
    DECODERS.get_or_init(|| {
        let mut map: HashMap<SqlType, Decoder> = HashMap::new();
        map.insert(SqlType::Bool, decode::<bool>);
        map.insert(SqlType::SmallInt, decode::<i16>);
        map.insert(SqlType::Int, decode::<i32>);
        map.insert(SqlType::BigInt, decode::<i64>);
        map.insert(SqlType::Double, decode_double);
        map.insert(SqlType::Decimal, decode_decimal);
        map.insert(SqlType::Text, decode::<String>);
        map.insert(SqlType::Date, decode::<chrono::NaiveDate>);
        map.insert(SqlType::Time, decode::<chrono::NaiveTime>);
        map.insert(SqlType::Timestamp, decode::<chrono::NaiveDateTime>);
        map.insert(SqlType::TimestampTz, decode::<chrono::DateTime<chrono::Utc>>);
        map.insert(SqlType::Uuid, decode::<uuid::Uuid>);
        map.insert(SqlType::Json, decode::<serde_json::Value>);
        map
    })
}

/// Decode every column of a row into a [`Record`].
///
/// Unsupported column types fail with [`SqlError::Decode`] naming the column.
pub fn row_to_record(row: &Row) -> SqlResult<Record> {
    let table = decoders();
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let decoder = sql_type_of(column.type_())
                .and_then(|ty| table.get(&ty))
                .ok_or_else(|| {
                    SqlError::decode(
                        column.name(),
                        format!("unsupported column type {}", column.type_()),
                    )
                })?;
            decoder(row, idx)
        })
        .collect()
}

fn rows_to_records(rows: Vec<Row>) -> SqlResult<Vec<Record>> {
    rows.iter().map(row_to_record).collect()
}

impl Executor for tokio_postgres::Client {
    async fn query_records(&self, sql: &str) -> SqlResult<Vec<Record>> {
        let rows = tokio_postgres::Client::query(self, sql, &[]).await?;
        rows_to_records(rows)
    }

    async fn execute_sql(&self, sql: &str) -> SqlResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, &[]).await?)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn query_records(&self, sql: &str) -> SqlResult<Vec<Record>> {
        let rows = tokio_postgres::Transaction::query(self, sql, &[]).await?;
        rows_to_records(rows)
    }

    async fn execute_sql(&self, sql: &str) -> SqlResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, sql, &[]).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_builtin_types() {
        assert_eq!(sql_type_of(&Type::INT4), Some(SqlType::Int));
        assert_eq!(sql_type_of(&Type::FLOAT4), Some(SqlType::Double));
        assert_eq!(sql_type_of(&Type::VARCHAR), Some(SqlType::Text));
        assert_eq!(sql_type_of(&Type::JSONB), Some(SqlType::Json));
        assert_eq!(sql_type_of(&Type::TIMESTAMPTZ), Some(SqlType::TimestampTz));
        assert_eq!(sql_type_of(&Type::INT4_ARRAY), None);
    }

    #[test]
    fn every_mapped_type_has_a_decoder() {
        let table = decoders();
        for ty in [
            Type::BOOL,
            Type::INT2,
            Type::INT8,
            Type::NUMERIC,
            Type::TEXT,
            Type::DATE,
            Type::TIME,
            Type::TIMESTAMP,
            Type::UUID,
            Type::JSON,
        ] {
            let sql_type = sql_type_of(&ty).unwrap();
            assert!(table.contains_key(&sql_type), "no decoder for {ty}");
        }
    }
}
