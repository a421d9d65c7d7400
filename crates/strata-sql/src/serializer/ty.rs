use super::{Formatter, Params, ToSql};

use strata_core::schema::db::Type;

impl ToSql for &Type {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let postgresql = f.serializer.is_postgresql();

        match self {
            Type::Boolean => fmt!(f, "BOOLEAN"),
            Type::Integer if postgresql => fmt!(f, "BIGINT"),
            Type::Integer => fmt!(f, "INTEGER"),
            Type::Float if postgresql => fmt!(f, "DOUBLE PRECISION"),
            Type::Float => fmt!(f, "REAL"),
            Type::Text => fmt!(f, "TEXT"),
            Type::VarChar(size) => {
                let size = *size;
                fmt!(f, "VARCHAR(" size ")")
            }
            Type::Timestamp if postgresql => fmt!(f, "TIMESTAMPTZ"),
            Type::Timestamp => fmt!(f, "TIMESTAMP"),
            Type::Json if postgresql => fmt!(f, "JSONB"),
            Type::Json => fmt!(f, "JSON"),
            Type::Custom(name) => fmt!(f, name),
        }
    }
}
