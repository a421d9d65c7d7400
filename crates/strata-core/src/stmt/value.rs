use chrono::{DateTime, SecondsFormat, Utc};

/// A dynamically typed value passed to and returned from the database.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// An instant in time, always UTC
    DateTime(DateTime<Utc>),

    /// A JSON document
    Json(serde_json::Value),

    /// A list of values. Used for operand lists and array fields.
    List(Vec<Value>),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F64(v) => Some(v),
            Self::I64(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Interprets the value as a flag. Storage engines without a boolean type
    /// return 0/1 integers.
    pub fn to_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            Self::I64(v) => Some(v != 0),
            _ => None,
        }
    }

    /// Short name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::I64(_) => "integer",
            Self::F64(_) => "number",
            Self::String(_) => "text",
            Self::DateTime(_) => "datetime",
            Self::Json(_) => "json",
            Self::List(_) => "list",
        }
    }

    /// Formats a datetime the way it is stored in text columns.
    ///
    /// Fixed precision keeps lexical and chronological order identical.
    pub fn format_date_time(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Parses an RFC 3339 datetime into UTC.
    pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Plain JSON representation of the value, used when embedding rows in
    /// other rows. Datetimes become RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::I64(v) => serde_json::Value::from(*v),
            Self::F64(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::String(v) => serde_json::Value::String(v.clone()),
            Self::DateTime(v) => serde_json::Value::String(Self::format_date_time(v)),
            Self::Json(v) => v.clone(),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Converts a JSON scalar or array into the closest value. Objects stay
    /// JSON.
    pub fn from_json(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(v) => Value::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Value::I64(v),
                None => n.as_f64().map(Value::F64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(v) => Value::String(v),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            value @ serde_json::Value::Object(_) => Value::Json(value),
        }
    }
}

impl core::fmt::Display for Value {
    /// Renders the value for diagnostics: strings are single-quoted.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v:?}"),
            Self::String(v) => write!(f, "'{v}'"),
            Self::DateTime(v) => write!(f, "'{}'", Self::format_date_time(v)),
            Self::Json(v) => write!(f, "'{v}'"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    core::fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I64(src.into())
    }
}

impl From<u32> for Value {
    fn from(src: u32) -> Self {
        Self::I64(src.into())
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Self {
        Self::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Self {
        Self::DateTime(src)
    }
}

impl From<serde_json::Value> for Value {
    fn from(src: serde_json::Value) -> Self {
        Self::Json(src)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(src: Vec<T>) -> Self {
        Self::List(src.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}
