use crate::error::SourceError;
use chrono::{DateTime, NaiveDateTime, Utc};
use model::{core::value::Value, records::row::RowData};
use rust_decimal::Decimal;
use tokio_postgres::{
    Row as PgRow,
    types::{FromSql, Type},
};
use tracing::warn;
use uuid::Uuid;

/// Decodes one Postgres row into pipeline values, by column type OID.
/// Unknown types are tried as text and decode to null when that fails, so a
/// single exotic column never aborts a page.
pub(crate) fn decode_row(row: &PgRow) -> Result<RowData, SourceError> {
    let mut fields = Vec::with_capacity(row.columns().len());

    for (idx, column) in row.columns().iter().enumerate() {
        let value = decode_value(row, idx, column.type_(), column.name())?;
        fields.push((column.name().to_string(), value));
    }

    Ok(RowData::new(fields))
}

fn decode_value(
    row: &PgRow,
    idx: usize,
    ty: &Type,
    name: &str,
) -> Result<Value, SourceError> {
    let value = match *ty {
        Type::BOOL => opt(row, idx, name, Value::Boolean)?,
        Type::INT2 => opt(row, idx, name, |v: i16| Value::Int(v as i64))?,
        Type::INT4 => opt(row, idx, name, |v: i32| Value::Int(v as i64))?,
        Type::INT8 => opt(row, idx, name, Value::Int)?,
        Type::FLOAT4 => opt(row, idx, name, |v: f32| Value::Float(v as f64))?,
        Type::FLOAT8 => opt(row, idx, name, Value::Float)?,
        // Decoded as text to preserve precision through the pipeline
        Type::NUMERIC => opt(row, idx, name, |v: Decimal| Value::String(v.to_string()))?,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            opt(row, idx, name, Value::String)?
        }
        Type::DATE => opt(row, idx, name, Value::Date)?,
        Type::TIMESTAMP => opt(row, idx, name, |v: NaiveDateTime| {
            Value::Timestamp(v.and_utc())
        })?,
        Type::TIMESTAMPTZ => opt(row, idx, name, |v: DateTime<Utc>| Value::Timestamp(v))?,
        Type::UUID => opt(row, idx, name, |v: Uuid| Value::Uuid(v))?,
        Type::JSON | Type::JSONB => opt(row, idx, name, Value::Json)?,
        Type::BYTEA => opt(row, idx, name, Value::Bytes)?,
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => opt(row, idx, name, |v: Vec<String>| {
            Value::Array(v.into_iter().map(Value::String).collect())
        })?,
        Type::INT4_ARRAY => opt(row, idx, name, |v: Vec<i32>| {
            Value::Array(v.into_iter().map(|i| Value::Int(i as i64)).collect())
        })?,
        Type::INT8_ARRAY => opt(row, idx, name, |v: Vec<i64>| {
            Value::Array(v.into_iter().map(Value::Int).collect())
        })?,
        _ => match row.try_get::<_, Option<String>>(idx) {
            Ok(Some(v)) => Value::String(v),
            Ok(None) => Value::Null,
            Err(_) => {
                warn!("Cannot decode column {name} of type {ty}, passing null");
                Value::Null
            }
        },
    };

    Ok(value)
}

fn opt<'a, T, F>(row: &'a PgRow, idx: usize, name: &str, into: F) -> Result<Value, SourceError>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    match row.try_get::<_, Option<T>>(idx) {
        Ok(Some(v)) => Ok(into(v)),
        Ok(None) => Ok(Value::Null),
        Err(err) => Err(SourceError::Decode {
            column: name.to_string(),
            reason: err.to_string(),
        }),
    }
}
