use super::Value;
use crate::Result;

use serde_json::{Map, Number, Value as Json};

const DATE_TIME_TAG: &str = "$datetime";
const JSON_TAG: &str = "$json";

impl Value {
    /// Encodes the value as JSON without losing its type.
    ///
    /// Values with no JSON counterpart are wrapped in a single-key object:
    /// `{"$datetime": "<rfc3339>"}` and `{"$json": <document>}`.
    pub fn to_tagged_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::I64(v) => Json::from(*v),
            Value::F64(v) => Number::from_f64(*v).map(Json::Number).unwrap_or(Json::Null),
            Value::String(v) => Json::String(v.clone()),
            Value::DateTime(v) => tagged(DATE_TIME_TAG, Json::String(Value::format_date_time(v))),
            Value::Json(v) => tagged(JSON_TAG, v.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_tagged_json).collect()),
        }
    }

    /// Decodes a value produced by [`Value::to_tagged_json`].
    ///
    /// Untagged objects are accepted as JSON documents.
    pub fn from_tagged_json(json: Json) -> Result<Value> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Bool(v),
            Json::Number(n) => match n.as_i64() {
                Some(v) => Value::I64(v),
                None => match n.as_f64() {
                    Some(v) => Value::F64(v),
                    None => bail!("number `{n}` is out of range"),
                },
            },
            Json::String(v) => Value::String(v),
            Json::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::from_tagged_json)
                    .collect::<Result<_>>()?,
            ),
            Json::Object(mut map) if map.len() == 1 => {
                if let Some(tag) = map.remove(DATE_TIME_TAG) {
                    let Some(text) = tag.as_str() else {
                        bail!("`{DATE_TIME_TAG}` must hold a string");
                    };
                    match Value::parse_date_time(text) {
                        Some(dt) => Value::DateTime(dt),
                        None => bail!("invalid RFC 3339 datetime `{text}`"),
                    }
                } else if let Some(doc) = map.remove(JSON_TAG) {
                    Value::Json(doc)
                } else {
                    Value::Json(Json::Object(map))
                }
            }
            json @ Json::Object(_) => Value::Json(json),
        })
    }
}

fn tagged(tag: &str, value: Json) -> Json {
    let mut map = Map::new();
    map.insert(tag.to_string(), value);
    Json::Object(map)
}
