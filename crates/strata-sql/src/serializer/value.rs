use super::{Formatter, Params, ToSql};

use strata_core::stmt::Value;

/// A value rendered inline, used where parameters cannot be bound such as
/// column defaults.
pub(super) struct Literal<'a>(pub(super) &'a Value);

/// Single-quoted string with embedded quotes doubled.
struct Quoted<'a>(&'a str);

impl ToSql for Quoted<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push('\'');
        for c in self.0.chars() {
            if c == '\'' {
                f.dst.push('\'');
            }
            f.dst.push(c);
        }
        f.dst.push('\'');
    }
}

impl ToSql for Literal<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let postgresql = f.serializer.is_postgresql();

        match self.0 {
            Value::Null => fmt!(f, "NULL"),
            Value::Bool(true) if postgresql => fmt!(f, "TRUE"),
            Value::Bool(false) if postgresql => fmt!(f, "FALSE"),
            Value::Bool(true) => fmt!(f, "1"),
            Value::Bool(false) => fmt!(f, "0"),
            Value::I64(v) => f.dst.push_str(&v.to_string()),
            // Debug formatting always keeps a decimal point or exponent
            Value::F64(v) if v.is_finite() => f.dst.push_str(&format!("{v:?}")),
            Value::F64(_) => fmt!(f, "NULL"),
            Value::String(v) => fmt!(f, Quoted(v)),
            Value::DateTime(v) => {
                let text = Value::format_date_time(v);
                fmt!(f, Quoted(&text));
                if postgresql {
                    fmt!(f, "::timestamptz");
                }
            }
            value @ (Value::Json(_) | Value::List(_)) => {
                let text = value.to_json().to_string();
                fmt!(f, Quoted(&text));
                if postgresql {
                    fmt!(f, "::jsonb");
                }
            }
        }
    }
}
