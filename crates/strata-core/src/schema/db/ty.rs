use crate::{driver, schema::app, Result};

use serde::Serialize;

/// Database-level storage types.
///
/// These are the types that appear in `CREATE TABLE` statements. Field kinds
/// map onto them through the driver's [`driver::StorageTypes`]; a field may
/// override the mapping with an explicit storage type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// A boolean value
    Boolean,

    /// A 64-bit signed integer
    Integer,

    /// A double precision float
    Float,

    /// Unconstrained text type
    Text,

    /// Text type with an explicit maximum length
    VarChar(u64),

    /// An instant in time with time zone
    Timestamp,

    /// Binary JSON document
    Json,

    /// User-specified unrecognized type
    Custom(String),
}

impl Type {
    /// Maps a declared field onto its storage type.
    pub fn from_app(field: &app::Field, db: &driver::StorageTypes) -> Type {
        if let Some(ty) = &field.storage_ty {
            return ty.clone();
        }

        match field.kind {
            app::FieldKind::Text => db.default_string_type.clone(),
            app::FieldKind::Integer => Type::Integer,
            app::FieldKind::Number => Type::Float,
            app::FieldKind::Boolean => db.boolean.clone(),
            app::FieldKind::DateTime => db.date_time.clone(),
            app::FieldKind::Json | app::FieldKind::Array(_) => db.json.clone(),
        }
    }

    /// Parses a type name as reported by a database catalog.
    ///
    /// Unrecognized names are kept verbatim as [`Type::Custom`].
    pub fn from_sql_name(name: &str) -> Type {
        let normalized = name.trim().to_ascii_lowercase();

        if let Some(len) = normalized
            .strip_prefix("character varying(")
            .or_else(|| normalized.strip_prefix("varchar("))
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|len| len.trim().parse().ok())
        {
            return Type::VarChar(len);
        }

        match normalized.as_str() {
            "boolean" | "bool" => Type::Boolean,
            "integer" | "int" | "bigint" | "int8" | "int4" | "smallint" => Type::Integer,
            "real" | "double precision" | "float8" | "double" | "float" => Type::Float,
            "text" | "character varying" | "varchar" => Type::Text,
            "timestamp with time zone" | "timestamptz" => Type::Timestamp,
            "jsonb" | "json" => Type::Json,
            _ => Type::Custom(name.trim().to_string()),
        }
    }

    pub(crate) fn verify(&self, db: &driver::Capability) -> Result<()> {
        match *self {
            Type::VarChar(size) => match db.storage_types.varchar {
                Some(max) if size > max => Err(crate::Error::unsupported_feature(format!(
                    "VARCHAR({}) exceeds database maximum of {}",
                    size, max
                ))),
                None => Err(crate::Error::unsupported_feature(
                    "VARCHAR type is not supported by this database",
                )),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}
