use chrono::{DateTime, NaiveDateTime, Utc};
use std::error::Error;
use strata_core::stmt::Value as CoreValue;
use tokio_postgres::{
    types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type},
    Column, Row,
};

type BoxError = Box<dyn Error + Sync + Send>;

/// A parameter converted to whatever type PostgreSQL inferred for its
/// placeholder.
#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => match *ty {
                Type::BOOL => value.to_sql(ty, out),
                _ => integer(i64::from(*value), ty, out),
            },
            CoreValue::I64(value) => integer(*value, ty, out),
            CoreValue::F64(value) => match *ty {
                Type::FLOAT8 => value.to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                _ => text(&value.to_string(), ty, out),
            },
            CoreValue::String(value) => match *ty {
                Type::TIMESTAMPTZ | Type::TIMESTAMP => match CoreValue::parse_date_time(value) {
                    Some(value) => date_time(&value, ty, out),
                    None => Err(format!("`{value}` is not an RFC 3339 datetime").into()),
                },
                Type::JSON | Type::JSONB => serde_json::Value::String(value.clone()).to_sql(ty, out),
                _ => text(value, ty, out),
            },
            CoreValue::DateTime(value) => date_time(value, ty, out),
            value @ (CoreValue::Json(_) | CoreValue::List(_)) => match *ty {
                Type::JSON | Type::JSONB => value.to_json().to_sql(ty, out),
                _ => text(&value.to_json().to_string(), ty, out),
            },
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer(value: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::BOOL => (value != 0).to_sql(ty, out),
        _ => text(&value.to_string(), ty, out),
    }
}

fn date_time(value: &DateTime<Utc>, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::TIMESTAMPTZ => value.to_sql(ty, out),
        Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
        _ => text(&CoreValue::format_date_time(value), ty, out),
    }
}

fn text(value: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if <&str as ToSql>::accepts(ty) {
        value.to_sql(ty, out)
    } else {
        Err(format!("cannot bind `{value}` to a parameter of type {ty}").into())
    }
}

/// Converts a PostgreSQL value within a row to a [`strata_core::stmt::Value`].
pub fn from_row(row: &Row, index: usize, column: &Column) -> strata_core::Result<CoreValue> {
    fn get<'a, T>(row: &'a Row, index: usize) -> strata_core::Result<Option<T>>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get::<usize, Option<T>>(index)
            .map_err(strata_core::Error::driver_operation_failed)
    }

    // NOTE: the inner representation of the PostgreSQL type enum is not
    // accessible, so each type is matched by hand.
    let ty = column.type_();
    let value = if *ty == Type::BOOL {
        get::<bool>(row, index)?.map(CoreValue::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, index)?.map(|v| CoreValue::I64(v.into()))
    } else if *ty == Type::INT4 {
        get::<i32>(row, index)?.map(|v| CoreValue::I64(v.into()))
    } else if *ty == Type::INT8 {
        get::<i64>(row, index)?.map(CoreValue::I64)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, index)?.map(|v| CoreValue::F64(v.into()))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, index)?.map(CoreValue::F64)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        get::<String>(row, index)?.map(CoreValue::String)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, index)?.map(CoreValue::DateTime)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, index)?.map(|v| CoreValue::DateTime(v.and_utc()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        get::<serde_json::Value>(row, index)?.map(CoreValue::Json)
    } else {
        return Err(strata_core::Error::unsupported_feature(format!(
            "reading PostgreSQL `{ty}` columns is not supported; column={}",
            column.name()
        )));
    };

    Ok(value.unwrap_or(CoreValue::Null))
}
