//! Conversion between wire-tagged parameters / column values and PostgreSQL types.
//!
//! PostgreSQL binds with the binary protocol, which is strict about types: an
//! `i64` cannot be sent for an `int4` placeholder. Each bound parameter is
//! therefore coerced to the Rust type matching the placeholder type the server
//! inferred during `prepare`.

use postgres::types::{FromSql, ToSql, Type};
use postgres::Row;

use crate::db::backend::DriverError;
use crate::db::param::BoundParam;
use crate::db::value::Value;

/// A parameter ready to be passed to `postgres`.
pub(crate) type SqlParam = Box<dyn ToSql + Sync>;

fn boxed<T: ToSql + Sync + 'static>(value: T) -> SqlParam {
    Box::new(value)
}

fn mismatch(param: &BoundParam, ty: &Type) -> DriverError {
    DriverError::new(
        "42804",
        format!("cannot bind {} parameter to column of type {}", param.wire_type(), ty.name()),
    )
}

fn out_of_range(value: impl std::fmt::Display, ty: &Type) -> DriverError {
    DriverError::new("22003", format!("value {} out of range for type {}", value, ty.name()))
}

fn invalid_text(value: &str, ty: &Type) -> DriverError {
    DriverError::new(
        "22P02",
        format!("invalid input syntax for type {}: \"{}\"", ty.name(), value),
    )
}

fn accepts_text(ty: &Type) -> bool {
    <String as ToSql>::accepts(ty)
}

/// Coerce a bound parameter to the placeholder type `ty`.
pub(crate) fn to_sql_param(param: &BoundParam, ty: &Type) -> Result<SqlParam, DriverError> {
    match param {
        BoundParam::Null => Ok(null_for(ty)),
        BoundParam::Integer(i) => integer_for(*i, ty).ok_or_else(|| mismatch(param, ty))?,
        BoundParam::Float(f) => float_for(*f, ty).ok_or_else(|| mismatch(param, ty)),
        BoundParam::Text(s) => text_for(s, ty).ok_or_else(|| mismatch(param, ty))?,
    }
}

fn null_for(ty: &Type) -> SqlParam {
    if *ty == Type::BOOL {
        boxed(None::<bool>)
    } else if *ty == Type::INT2 {
        boxed(None::<i16>)
    } else if *ty == Type::INT4 {
        boxed(None::<i32>)
    } else if *ty == Type::INT8 {
        boxed(None::<i64>)
    } else if *ty == Type::OID {
        boxed(None::<u32>)
    } else if *ty == Type::FLOAT4 {
        boxed(None::<f32>)
    } else if *ty == Type::FLOAT8 {
        boxed(None::<f64>)
    } else if *ty == Type::BYTEA {
        boxed(None::<Vec<u8>>)
    } else {
        boxed(None::<String>)
    }
}

/// `None` means the type cannot take an integer at all.
fn integer_for(i: i64, ty: &Type) -> Option<Result<SqlParam, DriverError>> {
    let converted = if *ty == Type::INT2 {
        i16::try_from(i).map(boxed).map_err(|_| out_of_range(i, ty))
    } else if *ty == Type::INT4 {
        i32::try_from(i).map(boxed).map_err(|_| out_of_range(i, ty))
    } else if *ty == Type::INT8 {
        Ok(boxed(i))
    } else if *ty == Type::OID {
        u32::try_from(i).map(boxed).map_err(|_| out_of_range(i, ty))
    } else if *ty == Type::FLOAT4 {
        Ok(boxed(i as f32))
    } else if *ty == Type::FLOAT8 {
        Ok(boxed(i as f64))
    } else if *ty == Type::BOOL {
        Ok(boxed(i != 0))
    } else if accepts_text(ty) {
        Ok(boxed(i.to_string()))
    } else {
        return None;
    };
    Some(converted)
}

fn float_for(f: f64, ty: &Type) -> Option<SqlParam> {
    if *ty == Type::FLOAT8 {
        Some(boxed(f))
    } else if *ty == Type::FLOAT4 {
        Some(boxed(f as f32))
    } else if accepts_text(ty) {
        Some(boxed(f.to_string()))
    } else {
        None
    }
}

/// Text is parsed into numeric and boolean placeholder types.
fn text_for(s: &str, ty: &Type) -> Option<Result<SqlParam, DriverError>> {
    let trimmed = s.trim();
    let converted = if accepts_text(ty) {
        Ok(boxed(s.to_string()))
    } else if *ty == Type::INT2 {
        trimmed.parse::<i16>().map(boxed).map_err(|_| invalid_text(s, ty))
    } else if *ty == Type::INT4 {
        trimmed.parse::<i32>().map(boxed).map_err(|_| invalid_text(s, ty))
    } else if *ty == Type::INT8 {
        trimmed.parse::<i64>().map(boxed).map_err(|_| invalid_text(s, ty))
    } else if *ty == Type::FLOAT4 {
        trimmed.parse::<f32>().map(boxed).map_err(|_| invalid_text(s, ty))
    } else if *ty == Type::FLOAT8 {
        trimmed.parse::<f64>().map(boxed).map_err(|_| invalid_text(s, ty))
    } else if *ty == Type::BOOL {
        match trimmed.to_ascii_lowercase().as_str() {
            "t" | "true" | "1" | "yes" | "on" => Ok(boxed(true)),
            "f" | "false" | "0" | "no" | "off" => Ok(boxed(false)),
            _ => Err(invalid_text(s, ty)),
        }
    } else if *ty == Type::BYTEA {
        Ok(boxed(s.as_bytes().to_vec()))
    } else {
        return None;
    };
    Some(converted)
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>, DriverError> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| DriverError::internal(format!("failed to read column {}: {}", idx, e)))
}

/// Decode column `idx` of `row` according to its declared type.
pub(crate) fn decode_column(row: &Row, idx: usize, ty: &Type) -> Result<Value, DriverError> {
    let value = if *ty == Type::BOOL {
        get::<bool>(row, idx)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, idx)?.map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT4 {
        get::<i32>(row, idx)?.map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT8 {
        get::<i64>(row, idx)?.map(Value::Int)
    } else if *ty == Type::OID {
        get::<u32>(row, idx)?.map(|v| Value::Int(i64::from(v)))
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, idx)?.map(|v| Value::Float(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, idx)?.map(Value::Float)
    } else if *ty == Type::BYTEA {
        get::<Vec<u8>>(row, idx)?.map(Value::Bytes)
    } else if <String as FromSql<'_>>::accepts(ty) {
        get::<String>(row, idx)?.map(Value::Text)
    } else {
        return Err(DriverError::new(
            "0A000",
            format!("unsupported column type {} (cast it to text in the query)", ty.name()),
        ));
    };
    Ok(value.unwrap_or(Value::Null))
}
