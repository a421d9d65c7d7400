use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use strata_core::stmt::Value as CoreValue;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core Strata value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a Strata value in its storage
    /// representation: booleans stay integers and datetimes and JSON stay
    /// text.
    pub fn from_sql(value: ValueRef<'_>) -> strata_core::Result<Self> {
        let core_value = match value {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => CoreValue::I64(value),
            ValueRef::Real(value) => CoreValue::F64(value),
            ValueRef::Text(value) => CoreValue::String(String::from_utf8_lossy(value).into_owned()),
            ValueRef::Blob(_) => {
                return Err(strata_core::Error::unsupported_feature(
                    "reading BLOB columns is not supported",
                ))
            }
        };

        Ok(Value(core_value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match &self.0 {
            CoreValue::Null => ToSqlOutput::Owned(SqlValue::Null),
            CoreValue::Bool(value) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*value))),
            CoreValue::I64(value) => ToSqlOutput::Owned(SqlValue::Integer(*value)),
            CoreValue::F64(value) => ToSqlOutput::Owned(SqlValue::Real(*value)),
            CoreValue::String(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            CoreValue::DateTime(value) => {
                ToSqlOutput::Owned(SqlValue::Text(CoreValue::format_date_time(value)))
            }
            value @ (CoreValue::Json(_) | CoreValue::List(_)) => {
                ToSqlOutput::Owned(SqlValue::Text(value.to_json().to_string()))
            }
        })
    }
}
