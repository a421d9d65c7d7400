//! Canonical `application/x-www-form-urlencoded` encoding of query
//! parameters.
//!
//! Keys always appear in the same order (`fields`, `where`, `orderBy`,
//! `limit`, `offset`, `populate`, `values`, `set`) and parameters holding
//! their default are left out, so equal parameter sets encode to equal
//! strings. `where`, `values` and `set` hold JSON in which values without a
//! JSON counterpart are tagged (see [`Value::to_tagged_json`]).
//!
//! ```text
//! fields=title%2Cviews&where=[{"field":"views","op":"gt","value":10}]&orderBy=-views&limit=5
//! ```
//! (shown unescaped for readability)

use super::{
    Condition, Delete, Direction, Filter, Insert, Operator, OrderBy, Record, Select, Update, Value,
};
use crate::Result;

use serde_json::{json, Map, Value as Json};
use url::form_urlencoded;

const KEYS: [&str; 8] = [
    "fields", "where", "orderBy", "limit", "offset", "populate", "values", "set",
];

/// Every parameter a query string can carry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub fields: Vec<String>,
    pub filter: Filter,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub populate: bool,
    pub values: Vec<Record>,
    pub set: Record,
}

impl Params {
    pub fn encode(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());

        if !self.fields.is_empty() {
            out.append_pair("fields", &self.fields.join(","));
        }

        if !self.filter.is_empty() {
            let conditions = self.filter.conditions().iter().map(condition_to_json).collect();
            out.append_pair("where", &Json::Array(conditions).to_string());
        }

        if !self.order_by.is_empty() {
            let order_by: Vec<_> = self
                .order_by
                .iter()
                .map(|order_by| match order_by.direction {
                    Direction::Asc => order_by.field.clone(),
                    Direction::Desc => format!("-{}", order_by.field),
                })
                .collect();
            out.append_pair("orderBy", &order_by.join(","));
        }

        if let Some(limit) = self.limit {
            out.append_pair("limit", &limit.to_string());
        }

        if let Some(offset) = self.offset {
            out.append_pair("offset", &offset.to_string());
        }

        if self.populate {
            out.append_pair("populate", "true");
        }

        if !self.values.is_empty() {
            let values = self.values.iter().map(record_to_json).collect();
            out.append_pair("values", &Json::Array(values).to_string());
        }

        if !self.set.is_empty() {
            out.append_pair("set", &record_to_json(&self.set).to_string());
        }

        out.finish()
    }

    pub fn decode(input: &str) -> Result<Params> {
        let input = input.strip_prefix('?').unwrap_or(input);
        let mut params = Params::default();
        let mut seen = vec![];

        for (key, value) in form_urlencoded::parse(input.as_bytes()) {
            let key = key.as_ref();
            if !KEYS.contains(&key) {
                bail!("unknown query parameter `{key}`");
            }
            if seen.iter().any(|seen| seen == key) {
                bail!("query parameter `{key}` is repeated");
            }
            seen.push(key.to_string());

            decode_param(&mut params, key, &value)
                .map_err(|err| err.context(format!("invalid `{key}` parameter")))?;
        }

        Ok(params)
    }

    /// Rejects parameters `allowed` does not list.
    fn only(self, operation: &str, allowed: &[&str]) -> Result<Params> {
        let present = [
            ("fields", !self.fields.is_empty()),
            ("where", !self.filter.is_empty()),
            ("orderBy", !self.order_by.is_empty()),
            ("limit", self.limit.is_some()),
            ("offset", self.offset.is_some()),
            ("populate", self.populate),
            ("values", !self.values.is_empty()),
            ("set", !self.set.is_empty()),
        ];

        for (key, present) in present {
            if present && !allowed.contains(&key) {
                bail!("`{key}` is not a parameter of {operation}");
            }
        }
        Ok(self)
    }
}

/// Re-encodes a query string canonically.
pub fn normalize(input: &str) -> Result<String> {
    Ok(Params::decode(input)?.encode())
}

impl Select {
    pub fn to_query_string(&self) -> String {
        Params {
            fields: self.fields.clone(),
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            populate: self.populate,
            ..Params::default()
        }
        .encode()
    }

    pub fn from_query_string(collection: impl Into<String>, input: &str) -> Result<Select> {
        let params = Params::decode(input)?.only(
            "select",
            &["fields", "where", "orderBy", "limit", "offset", "populate"],
        )?;
        Ok(Select {
            collection: collection.into(),
            fields: params.fields,
            filter: params.filter,
            order_by: params.order_by,
            limit: params.limit,
            offset: params.offset,
            populate: params.populate,
        })
    }
}

impl Insert {
    pub fn to_query_string(&self) -> String {
        Params {
            values: self.values.clone(),
            ..Params::default()
        }
        .encode()
    }

    pub fn from_query_string(collection: impl Into<String>, input: &str) -> Result<Insert> {
        let params = Params::decode(input)?.only("insert", &["values"])?;
        Ok(Insert {
            collection: collection.into(),
            values: params.values,
        })
    }
}

impl Update {
    pub fn to_query_string(&self) -> String {
        Params {
            filter: self.filter.clone(),
            set: self.set.clone(),
            ..Params::default()
        }
        .encode()
    }

    pub fn from_query_string(collection: impl Into<String>, input: &str) -> Result<Update> {
        let params = Params::decode(input)?.only("update", &["where", "set"])?;
        Ok(Update {
            collection: collection.into(),
            filter: params.filter,
            set: params.set,
        })
    }
}

impl Delete {
    pub fn to_query_string(&self) -> String {
        Params {
            filter: self.filter.clone(),
            ..Params::default()
        }
        .encode()
    }

    pub fn from_query_string(collection: impl Into<String>, input: &str) -> Result<Delete> {
        let params = Params::decode(input)?.only("delete", &["where"])?;
        Ok(Delete {
            collection: collection.into(),
            filter: params.filter,
        })
    }
}

fn decode_param(params: &mut Params, key: &str, value: &str) -> Result<()> {
    match key {
        "fields" => params.fields = split_list(value)?,
        "where" => {
            let Json::Array(conditions) = serde_json::from_str(value)? else {
                bail!("expected a JSON array of conditions");
            };
            params.filter = conditions
                .into_iter()
                .map(condition_from_json)
                .collect::<Result<_>>()?;
        }
        "orderBy" => {
            params.order_by = split_list(value)?
                .into_iter()
                .map(|field| match field.strip_prefix('-') {
                    Some(field) => OrderBy::desc(field),
                    None => OrderBy::asc(field),
                })
                .collect();
        }
        "limit" => params.limit = Some(parse_u64(value)?),
        "offset" => params.offset = Some(parse_u64(value)?),
        "populate" => {
            params.populate = match value {
                "true" => true,
                "false" => false,
                _ => bail!("expected `true` or `false`, got `{value}`"),
            }
        }
        "values" => {
            let Json::Array(records) = serde_json::from_str(value)? else {
                bail!("expected a JSON array of records");
            };
            params.values = records
                .into_iter()
                .map(record_from_json)
                .collect::<Result<_>>()?;
        }
        "set" => params.set = record_from_json(serde_json::from_str(value)?)?,
        _ => bail!("unknown query parameter `{key}`"),
    }
    Ok(())
}

fn split_list(value: &str) -> Result<Vec<String>> {
    value
        .split(',')
        .map(|item| {
            if item.is_empty() || item == "-" {
                Err(err!("empty list item"))
            } else {
                Ok(item.to_string())
            }
        })
        .collect()
}

fn parse_u64(value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| err!("expected a non-negative integer, got `{value}`"))
}

fn condition_to_json(condition: &Condition) -> Json {
    match condition {
        Condition::Compare { field, op, value } => json!({
            "field": field,
            "op": op.name(),
            "value": value.to_tagged_json(),
        }),
        Condition::Or(groups) => {
            let groups: Vec<Json> = groups
                .iter()
                .map(|group| Json::Array(group.iter().map(condition_to_json).collect()))
                .collect();
            json!({ "or": groups })
        }
        Condition::Raw { sql, params } => {
            let params: Vec<Json> = params.iter().map(Value::to_tagged_json).collect();
            json!({ "raw": sql, "params": params })
        }
    }
}

fn condition_from_json(json: Json) -> Result<Condition> {
    let Json::Object(mut map) = json else {
        bail!("expected a condition object, got `{json}`");
    };

    if let Some(groups) = map.remove("or") {
        let Json::Array(groups) = groups else {
            bail!("`or` must hold an array of condition arrays");
        };

        let groups = groups
            .into_iter()
            .map(|group| match group {
                Json::Array(conditions) => conditions
                    .into_iter()
                    .map(condition_from_json)
                    .collect::<Result<Vec<_>>>(),
                _ => Err(err!("`or` must hold an array of condition arrays")),
            })
            .collect::<Result<_>>()?;
        return Ok(Condition::Or(groups));
    }

    if let Some(sql) = map.remove("raw") {
        let Json::String(sql) = sql else {
            bail!("`raw` must hold a string");
        };
        let params = match map.remove("params") {
            None => vec![],
            Some(Json::Array(params)) => params
                .into_iter()
                .map(Value::from_tagged_json)
                .collect::<Result<_>>()?,
            Some(_) => bail!("`params` must hold an array"),
        };
        return Ok(Condition::Raw { sql, params });
    }

    let Some(Json::String(field)) = map.remove("field") else {
        bail!("condition is missing `field`");
    };
    let op = match map.remove("op") {
        Some(Json::String(name)) => {
            Operator::from_name(&name).ok_or_else(|| err!("unknown operator `{name}`"))?
        }
        _ => bail!("condition on `{field}` is missing `op`"),
    };
    let value = match map.remove("value") {
        Some(value) => Value::from_tagged_json(value)?,
        None => Value::Null,
    };

    Ok(Condition::Compare { field, op, value })
}

fn record_to_json(record: &Record) -> Json {
    let mut map = Map::new();
    for (name, value) in record {
        map.insert(name.to_string(), value.to_tagged_json());
    }
    Json::Object(map)
}

fn record_from_json(json: Json) -> Result<Record> {
    let Json::Object(map) = json else {
        bail!("expected a record object, got `{json}`");
    };

    map.into_iter()
        .map(|(name, value)| Value::from_tagged_json(value).map(|value| (name, value)))
        .collect()
}
