use super::AutoStrategy;
use crate::{
    schema::db,
    stmt::{Operator, Value},
};

use chrono::{DateTime, Utc};

/// Kinds of values an array field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Integer,
    Number,
    Boolean,
    DateTime,
}

/// The closed set of field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Boolean,
    DateTime,
    Json,
    Array(ScalarKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The field name, also its column name
    pub name: String,

    pub kind: FieldKind,

    /// True if the column accepts null.
    pub nullable: bool,

    /// True if inserts must provide a value.
    pub required: bool,

    /// Value used when an insert omits the field. Also the column default.
    pub default: Option<Value>,

    /// Specified if and how the field is populated automatically
    pub auto: Option<AutoStrategy>,

    /// Overrides the storage type derived from `kind`.
    pub storage_ty: Option<db::Type>,

    /// Previous name of the field. When the physical column still has this
    /// name it is renamed instead of dropped and re-added.
    pub renamed_from: Option<String>,

    /// Shorthand for a single-column unique index.
    pub unique: bool,

    /// Shorthand for a single-column index.
    pub indexed: bool,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
            ScalarKind::DateTime => "datetime",
        }
    }

    /// Normalizes `value` to this kind's canonical representation, or
    /// explains why it does not conform.
    ///
    /// Numbers accept integers, datetimes accept RFC 3339 text.
    pub fn coerce(self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (ScalarKind::Text, value @ Value::String(_)) => Ok(value),
            (ScalarKind::Integer, value @ Value::I64(_)) => Ok(value),
            (ScalarKind::Number, value @ Value::F64(_)) => Ok(value),
            (ScalarKind::Number, Value::I64(v)) => Ok(Value::F64(v as f64)),
            (ScalarKind::Boolean, value @ Value::Bool(_)) => Ok(value),
            (ScalarKind::DateTime, value @ Value::DateTime(_)) => Ok(value),
            (ScalarKind::DateTime, Value::String(text)) => match Value::parse_date_time(&text) {
                Some(dt) => Ok(Value::DateTime(dt)),
                None => Err(format!("`{text}` is not an RFC 3339 datetime")),
            },
            (kind, value) => Err(format!("expected {}, got {}", kind.name(), value.type_name())),
        }
    }

    fn zero_value(self) -> Value {
        match self {
            ScalarKind::Text => Value::String(String::new()),
            ScalarKind::Integer => Value::I64(0),
            ScalarKind::Number => Value::F64(0.0),
            ScalarKind::Boolean => Value::Bool(false),
            ScalarKind::DateTime => Value::DateTime(DateTime::<Utc>::default()),
        }
    }
}

impl FieldKind {
    /// Registry key of the kind.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::DateTime => "datetime",
            FieldKind::Json => "json",
            FieldKind::Array(_) => "array",
        }
    }

    /// The scalar kind, for scalar fields.
    pub fn scalar(self) -> Option<ScalarKind> {
        match self {
            FieldKind::Text => Some(ScalarKind::Text),
            FieldKind::Integer => Some(ScalarKind::Integer),
            FieldKind::Number => Some(ScalarKind::Number),
            FieldKind::Boolean => Some(ScalarKind::Boolean),
            FieldKind::DateTime => Some(ScalarKind::DateTime),
            FieldKind::Json | FieldKind::Array(_) => None,
        }
    }

    /// Value used to backfill existing rows when a non-null column without a
    /// declared default is added.
    pub fn zero_value(self) -> Value {
        match self {
            FieldKind::Json => Value::Json(serde_json::Value::Null),
            FieldKind::Array(_) => Value::List(vec![]),
            kind => kind
                .scalar()
                .map(ScalarKind::zero_value)
                .unwrap_or(Value::Null),
        }
    }

    /// Whether `op` may be applied to fields of this kind.
    pub fn supports(self, op: Operator) -> bool {
        use Operator::*;

        match self {
            FieldKind::Text => matches!(op, Eq | Ne | In | NotIn | Like | NotLike),
            FieldKind::Integer | FieldKind::Number | FieldKind::DateTime => matches!(
                op,
                Eq | Ne | Lt | Le | Gt | Ge | In | NotIn | Between | NotBetween
            ),
            FieldKind::Boolean | FieldKind::Json => matches!(op, Eq | Ne),
            FieldKind::Array(_) => matches!(op, Includes | Excludes | IncludesAny | ExcludesAny),
        }
    }
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Field {
        Field {
            name: name.into(),
            kind,
            nullable: true,
            required: false,
            default: None,
            auto: None,
            storage_ty: None,
            renamed_from: None,
            unique: false,
            indexed: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Field {
        Field::new(name, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Field {
        Field::new(name, FieldKind::Integer)
    }

    pub fn number(name: impl Into<String>) -> Field {
        Field::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Field {
        Field::new(name, FieldKind::Boolean)
    }

    pub fn date_time(name: impl Into<String>) -> Field {
        Field::new(name, FieldKind::DateTime)
    }

    pub fn json(name: impl Into<String>) -> Field {
        Field::new(name, FieldKind::Json)
    }

    pub fn array(name: impl Into<String>, of: ScalarKind) -> Field {
        Field::new(name, FieldKind::Array(of))
    }

    /// Inserts must provide a non-null value. Implies `not_null`.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn auto(mut self, strategy: AutoStrategy) -> Self {
        self.auto = Some(strategy);
        self
    }

    pub fn storage(mut self, ty: db::Type) -> Self {
        self.storage_ty = Some(ty);
        self
    }

    pub fn renamed_from(mut self, name: impl Into<String>) -> Self {
        self.renamed_from = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Default written into the column definition.
    ///
    /// Non-null columns always carry one so that existing rows can be
    /// backfilled when the column is added.
    pub fn column_default(&self) -> Option<Value> {
        match (&self.default, self.nullable) {
            (Some(value), _) => Some(value.clone()),
            (None, false) => Some(self.kind.zero_value()),
            (None, true) => None,
        }
    }
}
