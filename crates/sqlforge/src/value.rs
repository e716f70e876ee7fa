//! Runtime type tags, literal values and row mapping.
//!
//! Every expression carries a [`SqlType`] tag next to its static Rust type.
//! The tag drives runtime checks (e.g. LIKE on non-text operands) and the
//! row decoding dispatch table; it never changes how SQL is rendered.

use crate::error::{SqlError, SqlResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Declared SQL type of an expression, literal or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    /// Untyped `NULL`
    Null,
    Bool,
    SmallInt,
    Int,
    BigInt,
    Double,
    Decimal,
    Text,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    /// Row of heterogeneous columns
    Record,
    /// No result (UPDATE/DELETE)
    Unit,
}

impl SqlType {
    /// Human-readable type name.
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Null => "null",
            SqlType::Bool => "bool",
            SqlType::SmallInt => "smallint",
            SqlType::Int => "int",
            SqlType::BigInt => "bigint",
            SqlType::Double => "double",
            SqlType::Decimal => "decimal",
            SqlType::Text => "text",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Timestamp => "timestamp",
            SqlType::TimestampTz => "timestamptz",
            SqlType::Uuid => "uuid",
            SqlType::Json => "json",
            SqlType::Record => "record",
            SqlType::Unit => "unit",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SqlType::SmallInt | SqlType::Int | SqlType::BigInt | SqlType::Double | SqlType::Decimal
        )
    }

    pub fn is_textual(self) -> bool {
        matches!(self, SqlType::Text)
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            SqlType::Date | SqlType::Time | SqlType::Timestamp | SqlType::TimestampTz
        )
    }

    /// Whether values of `self` and `other` may meet in a comparison.
    ///
    /// `NULL` is comparable with everything, numbers with numbers and
    /// dates with timestamps. Anything else must match exactly.
    pub fn is_comparable_with(self, other: SqlType) -> bool {
        if self == other || self == SqlType::Null || other == SqlType::Null {
            return true;
        }
        if self.is_numeric() && other.is_numeric() {
            return true;
        }
        let datelike = |t: SqlType| {
            matches!(t, SqlType::Date | SqlType::Timestamp | SqlType::TimestampTz)
        };
        datelike(self) && datelike(other)
    }

    /// Result type of arithmetic between two numeric operands.
    pub(crate) fn widen(self, other: SqlType) -> SqlType {
        fn rank(t: SqlType) -> u8 {
            match t {
                SqlType::SmallInt => 1,
                SqlType::Int => 2,
                SqlType::BigInt => 3,
                SqlType::Decimal => 4,
                SqlType::Double => 5,
                _ => 0,
            }
        }
        if other == SqlType::Null || rank(self) >= rank(other) {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal SQL value.
///
/// Equality and hashing are structural. Doubles compare by bit pattern so
/// that `Value` can be `Eq + Hash` and live inside expression trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Double(f64),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl Value {
    /// The runtime type tag of this value.
    pub fn sql_type(&self) -> SqlType {
        match self {
            Value::Null => SqlType::Null,
            Value::Bool(_) => SqlType::Bool,
            Value::SmallInt(_) => SqlType::SmallInt,
            Value::Int(_) => SqlType::Int,
            Value::BigInt(_) => SqlType::BigInt,
            Value::Double(_) => SqlType::Double,
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(_) => SqlType::Decimal,
            Value::Text(_) => SqlType::Text,
            Value::Date(_) => SqlType::Date,
            Value::Time(_) => SqlType::Time,
            Value::Timestamp(_) => SqlType::Timestamp,
            Value::TimestampTz(_) => SqlType::TimestampTz,
            Value::Uuid(_) => SqlType::Uuid,
            Value::Json(_) => SqlType::Json,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::SmallInt(a), Value::SmallInt(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            #[cfg(feature = "rust_decimal")]
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::TimestampTz(a), Value::TimestampTz(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::SmallInt(v) => v.hash(state),
            Value::Int(v) => v.hash(state),
            Value::BigInt(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => v.hash(state),
            Value::Text(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::TimestampTz(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            // serde_json::Value has no Hash; its compact text is canonical enough.
            Value::Json(v) => v.to_string().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::literal(self))
    }
}

/// A fetched row: an ordered sequence of column values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Decode column `idx` into `T`.
    pub fn try_get<T: FromValue>(&self, idx: usize) -> SqlResult<T> {
        let value = self
            .values
            .get(idx)
            .cloned()
            .ok_or_else(|| SqlError::decode(idx.to_string(), "column index out of range"))?;
        relabel(idx, T::from_value(value))
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<Value> for Record {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

fn relabel<T>(idx: usize, result: SqlResult<T>) -> SqlResult<T> {
    match result {
        Err(SqlError::Decode { message, .. }) => Err(SqlError::decode(idx.to_string(), message)),
        other => other,
    }
}

/// Rust types with a fixed SQL type tag.
pub trait SqlTyped {
    const SQL_TYPE: SqlType;
}

/// Conversion of a Rust value into a SQL literal.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion of a fetched column value into a Rust value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> SqlResult<Self>;
}

/// Mapping of a whole fetched row into a Rust value.
///
/// Scalars read the first column, tuples read one column per element and
/// [`Record`] keeps the row as-is.
pub trait FromRecord: Sized {
    fn from_record(record: Record) -> SqlResult<Self>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl SqlTyped for $ty {
            const SQL_TYPE: SqlType = SqlType::$variant;
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromRecord for $ty {
            fn from_record(record: Record) -> SqlResult<Self> {
                record.try_get(0)
            }
        }
    )*};
}

impl_scalar!(
    bool => Bool,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f64 => Double,
    String => Text,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    Uuid => Uuid,
    serde_json::Value => Json,
);

#[cfg(feature = "rust_decimal")]
impl_scalar!(rust_decimal::Decimal => Decimal);

impl SqlTyped for Record {
    const SQL_TYPE: SqlType = SqlType::Record;
}

impl SqlTyped for () {
    const SQL_TYPE: SqlType = SqlType::Unit;
}

impl<T: SqlTyped> SqlTyped for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

fn mismatch<T>(expected: SqlType, found: &Value) -> SqlResult<T> {
    match found {
        Value::Null => Err(SqlError::decode("?", format!("unexpected NULL for {expected}"))),
        other => Err(SqlError::decode(
            "?",
            format!("expected {expected}, found {}", other.sql_type()),
        )),
    }
}

fn out_of_range<T>(expected: SqlType, found: &Value) -> SqlResult<T> {
    Err(SqlError::decode(
        "?",
        format!("value {found} out of range for {expected}"),
    ))
}

impl FromValue for Value {
    fn from_value(value: Value) -> SqlResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            other => mismatch(SqlType::Bool, &other),
        }
    }
}

impl FromValue for i16 {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::SmallInt(v) => Ok(v),
            Value::Int(v) => i16::try_from(v).or_else(|_| out_of_range(SqlType::SmallInt, &value)),
            Value::BigInt(v) => {
                i16::try_from(v).or_else(|_| out_of_range(SqlType::SmallInt, &value))
            }
            other => mismatch(SqlType::SmallInt, &other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::SmallInt(v) => Ok(i32::from(v)),
            Value::Int(v) => Ok(v),
            Value::BigInt(v) => i32::try_from(v).or_else(|_| out_of_range(SqlType::Int, &value)),
            other => mismatch(SqlType::Int, &other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::SmallInt(v) => Ok(i64::from(v)),
            Value::Int(v) => Ok(i64::from(v)),
            Value::BigInt(v) => Ok(v),
            other => mismatch(SqlType::BigInt, &other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Double(v) => Ok(v),
            Value::SmallInt(v) => Ok(f64::from(v)),
            Value::Int(v) => Ok(f64::from(v)),
            Value::BigInt(v) => Ok(v as f64),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => {
                use rust_decimal::prelude::ToPrimitive;
                v.to_f64()
                    .ok_or_else(|| SqlError::decode("?", format!("decimal {v} does not fit f64")))
            }
            other => mismatch(SqlType::Double, &other),
        }
    }
}

#[cfg(feature = "rust_decimal")]
impl FromValue for rust_decimal::Decimal {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::SmallInt(v) => Ok(v.into()),
            Value::Int(v) => Ok(v.into()),
            Value::BigInt(v) => Ok(v.into()),
            other => mismatch(SqlType::Decimal, &other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => mismatch(SqlType::Text, &other),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Date(v) => Ok(v),
            other => mismatch(SqlType::Date, &other),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Time(v) => Ok(v),
            other => mismatch(SqlType::Time, &other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::TimestampTz(v) => Ok(v.naive_utc()),
            other => mismatch(SqlType::Timestamp, &other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::TimestampTz(v) => Ok(v),
            Value::Timestamp(v) => Ok(v.and_utc()),
            other => mismatch(SqlType::TimestampTz, &other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Uuid(v) => Ok(v),
            other => mismatch(SqlType::Uuid, &other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Json(v) => Ok(v),
            other => mismatch(SqlType::Json, &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> SqlResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromRecord for Record {
    fn from_record(record: Record) -> SqlResult<Self> {
        Ok(record)
    }
}

impl FromRecord for Value {
    fn from_record(record: Record) -> SqlResult<Self> {
        record.try_get(0)
    }
}

impl<T: FromValue> FromRecord for Option<T> {
    fn from_record(record: Record) -> SqlResult<Self> {
        record.try_get(0)
    }
}

macro_rules! impl_from_record_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: FromValue),+> FromRecord for ($($name,)+) {
            fn from_record(record: Record) -> SqlResult<Self> {
                Ok(($(record.try_get::<$name>($idx)?,)+))
            }
        }
    };
}

impl_from_record_tuple!(A: 0, B: 1);
impl_from_record_tuple!(A: 0, B: 1, C: 2);
impl_from_record_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_from_record_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_from_record_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
