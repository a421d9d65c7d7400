use super::{placeholder_positions, Condition, ConditionError, Operator, Value};
use crate::schema::app::{Collection, FieldKind, ScalarKind, PRIMARY_KEY};

/// Conditions joined with AND. An empty filter matches every record.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Filter {
        Filter::default()
    }

    pub fn and(mut self, condition: Condition) -> Filter {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Checks every leaf against `collection`, depth-first and left to
    /// right, returning the filter with its operands normalized to the
    /// fields' representations.
    ///
    /// The first invalid leaf is reported.
    pub fn validate(&self, collection: &Collection) -> Result<Filter, ConditionError> {
        let conditions = self
            .conditions
            .iter()
            .map(|condition| validate_condition(condition, collection))
            .collect::<Result<_, _>>()?;
        Ok(Filter { conditions })
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Filter {
        Filter {
            conditions: vec![condition],
        }
    }
}

impl From<Vec<Condition>> for Filter {
    fn from(conditions: Vec<Condition>) -> Filter {
        Filter { conditions }
    }
}

impl FromIterator<Condition> for Filter {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Filter {
        Filter {
            conditions: iter.into_iter().collect(),
        }
    }
}

fn validate_condition(
    condition: &Condition,
    collection: &Collection,
) -> Result<Condition, ConditionError> {
    match condition {
        Condition::Compare { field, op, value } => {
            let value = validate_compare(collection, field, *op, value.clone())
                .map_err(|reason| ConditionError::new(field.as_str(), Some(*op), reason))?;
            Ok(Condition::Compare {
                field: field.clone(),
                op: *op,
                value,
            })
        }
        Condition::Or(groups) => {
            if groups.is_empty() || groups.iter().any(Vec::is_empty) {
                return Err(ConditionError::new("", None, "`or` groups must not be empty"));
            }

            let groups = groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|condition| validate_condition(condition, collection))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<_, _>>()?;
            Ok(Condition::Or(groups))
        }
        Condition::Raw { sql, params } => {
            let markers = placeholder_positions(sql).len();
            if markers != params.len() {
                return Err(ConditionError::new(
                    "",
                    None,
                    format!(
                        "raw fragment has {markers} `?` markers but {} params",
                        params.len()
                    ),
                ));
            }
            Ok(condition.clone())
        }
    }
}

fn validate_compare(
    collection: &Collection,
    field: &str,
    op: Operator,
    value: Value,
) -> Result<Value, String> {
    let Some(kind) = collection.kind_of(field) else {
        return Err(format!("unknown field of `{}`", collection.key));
    };

    if value.is_null() {
        if !matches!(op, Operator::Eq | Operator::Ne) {
            return Err("null is only comparable with eq and ne".to_string());
        }

        let nullable = field != PRIMARY_KEY
            && collection
                .find_field(field)
                .map(|field| field.nullable)
                .unwrap_or(false);
        if !nullable {
            return Err("field is not nullable".to_string());
        }
        return Ok(value);
    }

    if !kind.supports(op) {
        return Err(format!("operator not supported for {} fields", kind.name()));
    }

    match (kind, op) {
        (FieldKind::Json, _) => Ok(match value {
            value @ Value::Json(_) => value,
            value => Value::Json(value.to_json()),
        }),
        (FieldKind::Array(element), Operator::Includes | Operator::Excludes) => {
            if value.is_list() {
                return Err("expected a single element".to_string());
            }
            element.coerce(value)
        }
        (FieldKind::Array(element), _) => non_empty_list(element, value),
        (kind, Operator::In | Operator::NotIn) => non_empty_list(scalar(kind)?, value),
        (kind, Operator::Between | Operator::NotBetween) => {
            let scalar = scalar(kind)?;
            match value {
                Value::List(values) if values.len() == 2 => Ok(Value::List(
                    values
                        .into_iter()
                        .map(|value| scalar.coerce(value))
                        .collect::<Result<_, _>>()?,
                )),
                _ => Err("expected exactly two values".to_string()),
            }
        }
        (kind, _) => {
            if value.is_list() {
                return Err("expected a single value".to_string());
            }
            scalar(kind)?.coerce(value)
        }
    }
}

fn scalar(kind: FieldKind) -> Result<ScalarKind, String> {
    kind.scalar()
        .ok_or_else(|| format!("operator not supported for {} fields", kind.name()))
}

fn non_empty_list(element: ScalarKind, value: Value) -> Result<Value, String> {
    match value {
        Value::List(values) if !values.is_empty() => Ok(Value::List(
            values
                .into_iter()
                .map(|value| element.coerce(value))
                .collect::<Result<_, _>>()?,
        )),
        _ => Err("expected a non-empty list".to_string()),
    }
}
