use super::{Delimited, Formatter, Ident, Param, Params, ToSql};

use strata_core::stmt::{placeholder_positions, Condition, Operator, Value};

impl ToSql for &Condition {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Condition::Compare { field, op, value } => compare(f, field, *op, value),
            Condition::Or(groups) => {
                fmt!(f, "(" Delimited(groups.iter().map(Group), " OR ") ")");
            }
            Condition::Raw { sql, params } => {
                fmt!(f, "(" Raw { sql, params } ")");
            }
        }
    }
}

/// AND-ed conditions of an `or` group
struct Group<'a>(&'a Vec<Condition>);

impl ToSql for Group<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "(" Delimited(self.0, " AND ") ")");
    }
}

/// A raw fragment with its `?` markers replaced by placeholders.
pub(super) struct Raw<'a> {
    pub(super) sql: &'a str,
    pub(super) params: &'a [Value],
}

impl ToSql for Raw<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut start = 0;
        for (position, param) in placeholder_positions(self.sql).into_iter().zip(self.params) {
            f.dst.push_str(&self.sql[start..position]);
            Param(param).to_sql(f);
            start = position + 1;
        }
        f.dst.push_str(&self.sql[start..]);
    }
}

/// Comma-separated parameters of a list operand
struct List<'a>(&'a Value);

impl ToSql for List<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let items = match self.0 {
            Value::List(items) => &items[..],
            value => std::slice::from_ref(value),
        };
        fmt!(f, "(" Delimited(items.iter().map(Param), ", ") ")");
    }
}

fn compare<P: Params>(f: &mut Formatter<'_, P>, field: &str, op: Operator, value: &Value) {
    let column = Ident(field);

    if value.is_null() {
        match op {
            Operator::Ne => fmt!(f, column " IS NOT NULL"),
            _ => fmt!(f, column " IS NULL"),
        }
        return;
    }

    match op {
        Operator::Eq => fmt!(f, column " = " Param(value)),
        Operator::Ne => fmt!(f, column " <> " Param(value)),
        Operator::Lt => fmt!(f, column " < " Param(value)),
        Operator::Le => fmt!(f, column " <= " Param(value)),
        Operator::Gt => fmt!(f, column " > " Param(value)),
        Operator::Ge => fmt!(f, column " >= " Param(value)),
        Operator::Like => fmt!(f, column " LIKE " Param(value)),
        Operator::NotLike => fmt!(f, column " NOT LIKE " Param(value)),
        Operator::In => fmt!(f, column " IN " List(value)),
        Operator::NotIn => fmt!(f, column " NOT IN " List(value)),
        Operator::Between | Operator::NotBetween => {
            let not = if op == Operator::NotBetween { " NOT" } else { "" };
            match value.as_list() {
                Some([low, high]) => {
                    fmt!(f, column not " BETWEEN " Param(low) " AND " Param(high))
                }
                // Rejected by validation
                _ => fmt!(f, "1 = 0"),
            }
        }
        Operator::Includes
        | Operator::Excludes
        | Operator::IncludesAny
        | Operator::ExcludesAny => array_condition(f, field, op, value),
    }
}

/// Conditions over array fields. Arrays are stored as JSON arrays.
fn array_condition<P: Params>(f: &mut Formatter<'_, P>, field: &str, op: Operator, value: &Value) {
    let negated = matches!(op, Operator::Excludes | Operator::ExcludesAny);
    let elements = match value {
        Value::List(items) => &items[..],
        value => std::slice::from_ref(value),
    };

    if f.serializer.is_postgresql() {
        // A NULL array contains nothing
        let column = if negated {
            format!("COALESCE({}, '[]'::jsonb)", quoted(field))
        } else {
            quoted(field)
        };

        let contains: Vec<_> = elements
            .iter()
            .map(|element| Value::Json(serde_json::Value::Array(vec![element.to_json()])))
            .collect();

        if negated {
            fmt!(f, "NOT ");
        }
        fmt!(f, "(");
        let mut s = "";
        for element in &contains {
            fmt!(f, s column.as_str() " @> " Param(element));
            s = " OR ";
        }
        fmt!(f, ")");
    } else {
        let exists = if negated { "NOT EXISTS" } else { "EXISTS" };
        fmt!(
            f,
            exists " (SELECT 1 FROM json_each(" Ident(field) ") WHERE \"value\" IN "
            List(value) ")"
        );
    }
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
