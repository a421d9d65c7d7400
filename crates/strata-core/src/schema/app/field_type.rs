//! Field pipelines.
//!
//! Every value written to or read from a field passes through the
//! [`FieldType`] registered for the field's kind. Writes run
//! `populate → sanitize → validate`, reads run `cast`.

use super::{AutoStrategy, Field, FieldKind, ScalarKind};
use crate::{stmt::Value, Result};

use chrono::Utc;
use std::{collections::HashMap, fmt, sync::Arc};

/// The write being prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Insert,
    Update,
}

/// Capability interface for a field kind.
pub trait FieldType: Send + Sync + 'static {
    /// Fills in missing and automatic values. `value` is `None` when the
    /// write does not mention the field.
    fn populate(&self, field: &Field, value: Option<Value>, stage: Stage) -> Option<Value> {
        match (stage, field.auto, value) {
            (_, Some(AutoStrategy::NowOnUpdate), _) => Some(Value::DateTime(Utc::now())),
            (Stage::Insert, Some(AutoStrategy::Now), None) => Some(Value::DateTime(Utc::now())),
            (Stage::Insert, _, None) => field.default.clone(),
            (_, _, value) => value,
        }
    }

    /// Normalizes a caller-provided value. Must not fail; values that cannot
    /// be normalized are left for `validate` to reject.
    fn sanitize(&self, field: &Field, value: Value) -> Value;

    /// Checks a sanitized, non-null value. The error is a human readable
    /// message keyed by the field name.
    fn validate(&self, field: &Field, value: &Value) -> Result<(), String>;

    /// Converts a value read from storage into the field's representation.
    fn cast(&self, field: &Field, value: Value) -> Result<Value>;
}

/// Field types keyed by kind name.
#[derive(Clone)]
pub struct Registry {
    types: HashMap<String, Arc<dyn FieldType>>,
}

impl Registry {
    /// A registry with the built-in implementation of every kind.
    pub fn new() -> Registry {
        let mut registry = Registry {
            types: HashMap::new(),
        };

        for kind in [
            ScalarKind::Text,
            ScalarKind::Integer,
            ScalarKind::Number,
            ScalarKind::Boolean,
            ScalarKind::DateTime,
        ] {
            registry.register(kind.name(), Scalar(kind));
        }

        registry.register("json", Json);
        registry.register("array", Array);
        registry
    }

    /// Installs `ty` for the kind named `kind`, replacing the current one.
    pub fn register(&mut self, kind: impl Into<String>, ty: impl FieldType) -> &mut Self {
        self.types.insert(kind.into(), Arc::new(ty));
        self
    }

    /// The field type handling `kind`.
    pub fn get(&self, kind: FieldKind) -> &dyn FieldType {
        match self.types.get(kind.name()) {
            Some(ty) => ty.as_ref(),
            None => builtin(kind),
        }
    }

    /// Runs the write pipeline for one field.
    ///
    /// Returns `Ok(None)` when the field stays unset.
    pub fn prepare(
        &self,
        field: &Field,
        value: Option<Value>,
        stage: Stage,
    ) -> Result<Option<Value>, String> {
        let ty = self.get(field.kind);

        let Some(value) = ty.populate(field, value, stage) else {
            if stage == Stage::Insert && !field.nullable {
                return Err("is required".to_string());
            }
            return Ok(None);
        };

        let value = ty.sanitize(field, value);

        if value.is_null() {
            if field.required {
                return Err("is required".to_string());
            }
            if !field.nullable {
                return Err("must not be null".to_string());
            }
            return Ok(Some(value));
        }

        ty.validate(field, &value)?;
        Ok(Some(value))
    }

    /// Runs the read pipeline for one field.
    pub fn cast(&self, field: &Field, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        self.get(field.kind).cast(field, value)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.types.keys().collect();
        kinds.sort();
        f.debug_struct("Registry").field("kinds", &kinds).finish()
    }
}

fn builtin(kind: FieldKind) -> &'static dyn FieldType {
    static TEXT: Scalar = Scalar(ScalarKind::Text);
    static INTEGER: Scalar = Scalar(ScalarKind::Integer);
    static NUMBER: Scalar = Scalar(ScalarKind::Number);
    static BOOLEAN: Scalar = Scalar(ScalarKind::Boolean);
    static DATE_TIME: Scalar = Scalar(ScalarKind::DateTime);

    match kind {
        FieldKind::Text => &TEXT,
        FieldKind::Integer => &INTEGER,
        FieldKind::Number => &NUMBER,
        FieldKind::Boolean => &BOOLEAN,
        FieldKind::DateTime => &DATE_TIME,
        FieldKind::Json => &Json,
        FieldKind::Array(_) => &Array,
    }
}

struct Scalar(ScalarKind);

struct Json;

struct Array;

impl FieldType for Scalar {
    fn sanitize(&self, _field: &Field, value: Value) -> Value {
        match self.0.coerce(value.clone()) {
            Ok(value) => value,
            Err(_) => value,
        }
    }

    fn validate(&self, _field: &Field, value: &Value) -> Result<(), String> {
        self.0.coerce(value.clone()).map(|_| ())
    }

    fn cast(&self, _field: &Field, value: Value) -> Result<Value> {
        let kind = self.0;
        let value = match (kind, value) {
            // Storage without a boolean type returns 0/1.
            (ScalarKind::Boolean, Value::I64(v)) => Value::Bool(v != 0),
            (_, value) => value,
        };

        kind.coerce(value)
            .map_err(|reason| err!("cannot read {} value: {reason}", kind.name()))
    }
}

impl FieldType for Json {
    fn sanitize(&self, _field: &Field, value: Value) -> Value {
        match value {
            Value::Null | Value::Json(_) => value,
            value => Value::Json(value.to_json()),
        }
    }

    fn validate(&self, _field: &Field, value: &Value) -> Result<(), String> {
        match value {
            Value::Json(_) => Ok(()),
            value => Err(format!("expected json, got {}", value.type_name())),
        }
    }

    fn cast(&self, _field: &Field, value: Value) -> Result<Value> {
        match value {
            Value::Json(_) => Ok(value),
            // Text storage
            Value::String(text) => Ok(Value::Json(serde_json::from_str(&text)?)),
            value => Ok(Value::Json(value.to_json())),
        }
    }
}

impl FieldType for Array {
    fn sanitize(&self, field: &Field, value: Value) -> Value {
        let FieldKind::Array(of) = field.kind else {
            return value;
        };

        let items = match value {
            Value::List(items) => items,
            Value::Json(json @ serde_json::Value::Array(_)) => match Value::from_json(json) {
                Value::List(items) => items,
                value => return value,
            },
            value => return value,
        };

        Value::List(
            items
                .into_iter()
                .map(|item| match of.coerce(item.clone()) {
                    Ok(item) => item,
                    Err(_) => item,
                })
                .collect(),
        )
    }

    fn validate(&self, field: &Field, value: &Value) -> Result<(), String> {
        let FieldKind::Array(of) = field.kind else {
            return Err(format!("field `{}` is not an array", field.name));
        };

        let Value::List(items) = value else {
            return Err(format!("expected array, got {}", value.type_name()));
        };

        for (i, item) in items.iter().enumerate() {
            if let Err(reason) = of.coerce(item.clone()) {
                return Err(format!("element {i}: {reason}"));
            }
        }

        Ok(())
    }

    fn cast(&self, field: &Field, value: Value) -> Result<Value> {
        let value = match value {
            // Text storage
            Value::String(text) => Value::from_json(serde_json::from_str(&text)?),
            Value::Json(json) => Value::from_json(json),
            value => value,
        };

        let value = self.sanitize(field, value);
        self.validate(field, &value)
            .map_err(|reason| err!("cannot read array value: {reason}"))?;
        Ok(value)
    }
}
